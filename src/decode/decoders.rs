//! Decoder implementations

use super::types::{EnvelopeConfig, PageDecoder};
use crate::error::{DataSourceError, Error, Result};
use crate::pagination::{DocumentMetadata, DocumentWrapper, Page};
use crate::transport::TransportResponse;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Longest error body excerpt kept in a status error
const MAX_ERROR_BODY_CHARS: usize = 256;

// ============================================================================
// JSON Envelope Decoder
// ============================================================================

/// Decoder for JSON page envelopes
#[derive(Debug, Clone, Default)]
pub struct JsonPageDecoder {
    config: EnvelopeConfig,
}

impl JsonPageDecoder {
    /// Create a decoder for the default envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder for a custom envelope
    pub fn with_config(config: EnvelopeConfig) -> Self {
        Self { config }
    }

    /// Envelope configuration
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Decode the envelope, failing on anything that makes the whole page unusable
    pub fn decode_envelope<T: DeserializeOwned>(
        &self,
        response: &TransportResponse,
    ) -> Result<(Vec<DocumentWrapper<T>>, Option<String>)> {
        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            let excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(Error::Page(DataSourceError::status(
                response.status,
                format!("HTTP {}: {}", response.status, excerpt),
            )));
        }

        let body: Value = serde_json::from_slice(&response.body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;

        if !body.is_object() {
            return Err(Error::decode("Page envelope is not a JSON object"));
        }

        let documents = match extract_simple_path(&body, &self.config.documents_path) {
            Some(Value::Array(documents)) => documents,
            Some(other) => {
                return Err(Error::decode(format!(
                    "Expected an array at '{}', found {}",
                    self.config.documents_path,
                    json_type(other)
                )))
            }
            None => {
                return Err(Error::decode(format!(
                    "Missing documents at '{}'",
                    self.config.documents_path
                )))
            }
        };

        let token = self.extract_continuation(response, &body)?;
        let items: Vec<DocumentWrapper<T>> =
            documents.iter().map(|doc| self.decode_document(doc)).collect();

        let failed = items.iter().filter(|item| !item.is_ok()).count();
        if failed > 0 {
            warn!("{} of {} documents failed to decode", failed, items.len());
        }

        Ok((items, token))
    }

    /// Extract and validate the continuation token
    fn extract_continuation(
        &self,
        response: &TransportResponse,
        body: &Value,
    ) -> Result<Option<String>> {
        if let Some(path) = &self.config.continuation_path {
            return match extract_simple_path(body, path) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(token)) => validate_token(token),
                Some(other) => Err(Error::malformed_continuation(format!(
                    "expected a string at '{path}', found {}",
                    json_type(other)
                ))),
            };
        }

        match &self.config.continuation_header {
            Some(header) => response
                .headers
                .get(header)
                .map_or(Ok(None), validate_token),
            None => Ok(None),
        }
    }

    /// Decode one document; failures stay inside the wrapper
    fn decode_document<T: DeserializeOwned>(&self, doc: &Value) -> DocumentWrapper<T> {
        let json_value = doc.to_string();
        let metadata = self.extract_metadata(doc);

        if !doc.is_object() {
            return DocumentWrapper::failed(
                json_value,
                metadata,
                DataSourceError::document(format!(
                    "Document is not a JSON object, found {}",
                    json_type(doc)
                )),
            );
        }

        let value = match &self.config.value_field {
            Some(field) => match doc.get(field) {
                Some(value) => value,
                None => {
                    return DocumentWrapper::failed(
                        json_value,
                        metadata,
                        DataSourceError::document(format!("Missing field '{field}'")),
                    )
                }
            },
            None => doc,
        };

        match T::deserialize(value) {
            Ok(decoded) => DocumentWrapper::decoded(json_value, decoded, metadata),
            Err(e) => {
                debug!("Document {:?} failed to decode: {}", metadata.id, e);
                DocumentWrapper::failed(
                    json_value,
                    metadata,
                    DataSourceError::document(format!("Failed to deserialize document: {e}")),
                )
            }
        }
    }

    fn extract_metadata(&self, doc: &Value) -> DocumentMetadata {
        DocumentMetadata {
            id: string_field(doc, &self.config.id_field),
            partition: string_field(doc, &self.config.partition_field),
            etag: string_field(doc, &self.config.etag_field),
            last_updated: doc
                .get(&self.config.timestamp_field)
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

impl<T: DeserializeOwned> PageDecoder<T> for JsonPageDecoder {
    fn decode_page(&self, response: &TransportResponse) -> Page<T> {
        match self.decode_envelope(response) {
            Ok((items, token)) => Page::new(items, token),
            Err(e) => {
                warn!("Page failed to decode: {}", e);
                Page::failed(DataSourceError::from(&e))
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// An empty token means "no more pages". Control characters cannot be
/// echoed back in a header, so they mark the token as malformed.
fn validate_token(token: &str) -> Result<Option<String>> {
    if token.is_empty() {
        return Ok(None);
    }
    if token.chars().any(char::is_control) {
        return Err(Error::malformed_continuation(
            "token contains control characters",
        ));
    }
    Ok(Some(token.to_string()))
}

/// Read a scalar field as a string
fn string_field(doc: &Value, field: &str) -> Option<String> {
    match doc.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Simple path extraction (supports dot notation and array indexing)
pub(crate) fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        // Handle array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index: i64 = index_str.parse().ok()?;
            let arr = current.as_array()?;
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                usize::try_from(arr.len() as i64 + index).ok()?
            } else {
                usize::try_from(index).ok()?
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}
