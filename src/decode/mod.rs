//! Response decoder module
//!
//! # Overview
//!
//! Turns a transport response into a [`Page`](crate::pagination::Page):
//! the envelope is checked as a whole (status, JSON shape, continuation
//! token) and each document is then decoded on its own, so one bad document
//! never fails its page.

mod decoders;
mod types;

pub use decoders::JsonPageDecoder;
pub use types::{EnvelopeConfig, PageDecoder, DEFAULT_CONTINUATION_HEADER};
