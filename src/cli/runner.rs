//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::DocumentClient;
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::DocumentWrapper;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                path,
                partition,
                page_size,
                max_pages,
                token,
            } => {
                let mut config = self.load_config()?;
                if page_size.is_some() {
                    config.pagination.page_size = *page_size;
                }
                if max_pages.is_some() {
                    config.pagination.max_pages = *max_pages;
                }
                self.list(config, path, partition.as_deref(), token.as_deref())
                    .await
            }
            Commands::Validate => {
                let config = self.load_config()?;
                config.validate()?;
                self.emit(&json!({"valid": true, "endpoint": config.endpoint}));
                Ok(())
            }
        }
    }

    /// Build the configuration from the file and command-line overrides
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match (&self.cli.config, &self.cli.endpoint) {
            (Some(path), _) => ClientConfig::from_file(path)?,
            (None, Some(endpoint)) => ClientConfig::new(endpoint.clone()),
            (None, None) => {
                return Err(Error::config(
                    "either --config or --endpoint is required",
                ))
            }
        };

        if let Some(endpoint) = &self.cli.endpoint {
            config.endpoint.clone_from(endpoint);
        }

        for raw in &self.cli.headers {
            let (name, value) = parse_header(raw)?;
            config.http.set_header(name, value);
        }

        config.validate()?;
        Ok(config)
    }

    async fn list(
        &self,
        config: ClientConfig,
        path: &str,
        partition: Option<&str>,
        token: Option<&str>,
    ) -> Result<()> {
        let start = Instant::now();
        let client = DocumentClient::from_config(config)?;

        let mut cursor = match (partition, token) {
            (Some(_), Some(_)) => {
                return Err(Error::config("--partition and --token cannot be combined"))
            }
            (Some(partition), None) => client.list_partition::<Value>(path, partition)?,
            (None, Some(token)) => client.resume::<Value>(path, token)?,
            (None, None) => client.list::<Value>(path)?,
        };

        let mut documents = 0usize;
        let mut failed_documents = 0usize;
        while let Some(page) = cursor.next_page().await {
            if let Some(error) = page.error() {
                let failure: Result<()> = Err(Error::Page(error.clone()));
                return match resume_hint(cursor.resume_token()) {
                    Some(hint) => {
                        info!("{}", hint);
                        failure.context(hint)
                    }
                    None => failure,
                };
            }
            for document in page.items() {
                documents += 1;
                if !document.is_ok() {
                    failed_documents += 1;
                }
                self.emit(&document_json(document));
            }
        }

        if let Some(hint) = resume_hint(cursor.resume_token()) {
            info!("Stopped with more pages available; {}", hint);
        }

        info!(
            "Listed {} documents ({} failed to decode) in {} pages, {:?}",
            documents,
            failed_documents,
            cursor.pages_fetched(),
            start.elapsed()
        );
        Ok(())
    }

    fn emit(&self, value: &Value) {
        match self.cli.format {
            OutputFormat::Json => println!("{value}"),
            OutputFormat::Pretty => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                );
            }
        }
    }
}

/// Split a `NAME:VALUE` header argument
fn parse_header(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::InvalidHeader {
            name: raw.to_string(),
            message: "expected NAME:VALUE".to_string(),
        }),
    }
}

fn resume_hint(token: Option<&str>) -> Option<String> {
    token.map(|token| format!("resume with --token '{token}'"))
}

fn document_json(document: &DocumentWrapper<Value>) -> Value {
    let mut out = json!({
        "id": document.id(),
        "partition": document.partition(),
        "etag": document.etag(),
        "last_updated": document.last_updated().map(|t| t.to_rfc3339()),
    });
    match (document.value(), document.error()) {
        (Some(value), _) => out["value"] = value.clone(),
        (None, Some(error)) => {
            out["error"] = json!(error.message);
            out["raw"] = json!(document.json_value());
        }
        (None, None) => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataSourceError;
    use crate::pagination::DocumentMetadata;
    use clap::Parser;
    use std::io::Write;
    use test_case::test_case;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(args: &[&str]) -> Runner {
        let argv = std::iter::once("docstore-client").chain(args.iter().copied());
        Runner::new(Cli::parse_from(argv))
    }

    #[test_case("x-ms-version: 2018-12-31", "x-ms-version", "2018-12-31")]
    #[test_case("Authorization:type=master&sig=a:b", "Authorization", "type=master&sig=a:b")]
    fn test_parse_header(raw: &str, name: &str, value: &str) {
        assert_eq!(
            parse_header(raw).unwrap(),
            (name.to_string(), value.to_string())
        );
    }

    #[test_case("no-colon")]
    #[test_case(":value")]
    fn test_parse_header_rejects(raw: &str) {
        assert!(matches!(
            parse_header(raw).unwrap_err(),
            Error::InvalidHeader { .. }
        ));
    }

    #[test]
    fn test_document_json() {
        let metadata = DocumentMetadata {
            id: Some("d1".to_string()),
            ..Default::default()
        };
        let ok = DocumentWrapper::decoded("{}", json!({"title": "t"}), metadata.clone());
        let out = document_json(&ok);
        assert_eq!(out["id"], "d1");
        assert_eq!(out["value"]["title"], "t");
        assert!(out.get("error").is_none());

        let bad: DocumentWrapper<Value> =
            DocumentWrapper::failed("[1]", metadata, DataSourceError::document("not an object"));
        let out = document_json(&bad);
        assert_eq!(out["error"], "not an object");
        assert_eq!(out["raw"], "[1]");
    }

    #[test]
    fn test_header_flag_overrides_config_header_of_any_case() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            b"endpoint: https://example.com/colls/notes\nhttp:\n  default_headers:\n    x-ms-version: \"2018-12-31\"\n",
        )
        .unwrap();
        let config_path = file.path().to_str().unwrap();

        let config = runner(&["-C", config_path, "-H", "X-MS-Version: 2020-01-01", "validate"])
            .load_config()
            .unwrap();

        assert_eq!(
            config.http.headers().get("x-ms-version"),
            Some("2020-01-01")
        );
        assert_eq!(config.http.default_headers.len(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_reports_resume_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/colls/notes/docs"))
            .and(header("x-ms-continuation", "t1"))
            .respond_with(ResponseTemplate::new(503))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/colls/notes/docs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Documents": []}))
                    .insert_header("x-ms-continuation", "t1"),
            )
            .mount(&server)
            .await;

        let endpoint = format!("{}/colls/notes", server.uri());
        let err = runner(&["-e", &endpoint, "list", "docs"])
            .run()
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("--token 't1'"), "{message}");
        assert!(message.contains("503"), "{message}");
    }

    #[test]
    fn test_resume_hint() {
        assert_eq!(
            resume_hint(Some("abc")).as_deref(),
            Some("resume with --token 'abc'")
        );
        assert!(resume_hint(None).is_none());
    }
}
