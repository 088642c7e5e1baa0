//! Async client core for the Winnipeg Transit API.
//!
//! # Overview
//! Builds requests against the versioned API root, sends them with
//! `reqwest`, and decodes JSON answers into caller-supplied values. The API
//! credential travels as an `api-key` query parameter and is redacted from
//! every URL that can end up in a log line or an error.
//!
//! # Design
//! - `Client` is immutable after construction and cheap to clone; share it
//!   freely between tasks.
//! - Every request carries a [`Context`]. Canceling it (or letting its
//!   deadline pass) aborts the in-flight round-trip, and the context error
//!   wins over whatever the transport reports.
//! - [`Client::bare_do`] returns the live body for streaming;
//!   [`Client::execute`] validates the status, fills a [`Target`], and always
//!   drains and releases the body so the connection can be reused.
//! - Endpoint wrappers build on [`Client::new_request`] and add their own
//!   query parameters with [`Request::append_query`].

mod body;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod sanitize;

pub use body::MAX_BODY_SLURP;
pub use client::{Client, Target};
pub use config::{ClientConfig, API_KEY_PARAM, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use context::{Context, ContextError};
pub use error::{check_response, ApiError, ErrorResponse};
pub use http::{HttpMethod, Request, Response};
pub use sanitize::{redact_url, sanitize_url, REDACTED};
