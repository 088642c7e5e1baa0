//! Error types for the transit API client.
//!
//! Every variant that can embed a URL only ever holds a sanitized one, so
//! both the `Display` and `Debug` forms are safe to log. Variants produced
//! after a round-trip completed carry the [`Response`] so callers can still
//! look at the status and headers.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::body::read_to_end;
use crate::context::ContextError;
use crate::http::Response;

/// Errors returned by [`crate::Client`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[source] url::ParseError),

    #[error("base URL must have a trailing slash, but {0:?} does not")]
    MissingTrailingSlash(String),

    #[error("no API key configured, set TRANSIT_API_KEY")]
    MissingApiKey,

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP transport: {0}")]
    BuildTransport(#[source] reqwest::Error),

    #[error("a request context is required")]
    MissingContext,

    #[error("request path {0:?} must be relative to the base URL")]
    AbsolutePath(String),

    #[error("request path {0:?} resolves outside the base URL")]
    OutsideBaseUrl(String),

    #[error("invalid request path: {0}")]
    InvalidPath(#[source] url::ParseError),

    /// The request's context was canceled or expired before the round-trip
    /// finished.
    #[error(transparent)]
    Canceled(#[from] ContextError),

    /// Network, DNS, TLS or redirect failure. The URL inside has its
    /// credential redacted.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Status(#[from] ErrorResponse),

    #[error("{} {}: decoding response body: {source}", .response.method, .response.url)]
    Decode {
        response: Response,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} {}: reading response body: {source}", .response.method, .response.url)]
    Body {
        response: Response,
        #[source]
        source: reqwest::Error,
    },

    #[error("{} {}: writing response body: {source}", .response.method, .response.url)]
    Sink {
        response: Response,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// The response behind this error, for errors raised after the server
    /// answered.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ApiError::Status(err) => Some(&err.response),
            ApiError::Decode { response, .. }
            | ApiError::Body { response, .. }
            | ApiError::Sink { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, ApiError::Canceled(_))
    }
}

/// A non-2xx answer from the API.
///
/// `message` is whatever the server put in `responseText`; it stays empty
/// when the body is missing or is not the JSON error envelope.
#[derive(Debug, Clone, Error)]
#[error("{} {}: {} {}", .response.method, .response.url, .response.status, .message)]
pub struct ErrorResponse {
    pub response: Response,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "responseText", default)]
    message: String,
}

/// Turn a non-2xx response into an [`ErrorResponse`], reading the whole body
/// to recover the server's message. 2xx responses pass untouched.
pub async fn check_response(
    resp: &mut reqwest::Response,
    meta: &Response,
) -> Result<(), ErrorResponse> {
    if meta.is_success() {
        return Ok(());
    }

    let message = match read_to_end(resp).await {
        Ok(data) => serde_json::from_slice::<ErrorBody>(&data)
            .map(|body| body.message)
            .unwrap_or_default(),
        Err(err) => {
            debug!(error = %err.without_url(), "failed to read error body");
            String::new()
        }
    };

    let err = ErrorResponse {
        response: meta.clone(),
        message,
    };
    warn!(status = meta.status, url = %meta.url, message = %err.message, "API returned an error status");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn transport_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    fn meta(resp: &reqwest::Response) -> Response {
        let mut meta = Response::from_transport(HttpMethod::Get, resp);
        meta.url = url::Url::parse("https://api.example.com/v3/stops.json?api-key=REDACTED").unwrap();
        meta
    }

    #[tokio::test]
    async fn success_statuses_pass() {
        for status in [200, 204, 299] {
            let mut resp = transport_response(status, "not even json");
            let meta = meta(&resp);
            assert!(check_response(&mut resp, &meta).await.is_ok(), "{status}");
        }
    }

    #[tokio::test]
    async fn error_message_is_decoded() {
        let mut resp = transport_response(400, r#"{"responseText":"bad query"}"#);
        let meta = meta(&resp);
        let err = check_response(&mut resp, &meta).await.unwrap_err();

        assert_eq!(err.message, "bad query");
        assert_eq!(err.response.status, 400);
        assert_eq!(
            err.to_string(),
            "GET https://api.example.com/v3/stops.json?api-key=REDACTED: 400 bad query"
        );
    }

    #[tokio::test]
    async fn non_json_body_leaves_message_empty() {
        let mut resp = transport_response(502, "<html>bad gateway</html>");
        let meta = meta(&resp);
        let err = check_response(&mut resp, &meta).await.unwrap_err();

        assert!(err.message.is_empty());
        assert_eq!(err.response.status, 502);
    }

    #[tokio::test]
    async fn empty_body_leaves_message_empty() {
        let mut resp = transport_response(404, "");
        let meta = meta(&resp);
        let err = check_response(&mut resp, &meta).await.unwrap_err();
        assert!(err.message.is_empty());
    }

    #[test]
    fn response_is_exposed_for_status_errors() {
        let resp = transport_response(500, "");
        let err = ApiError::from(ErrorResponse {
            response: meta(&resp),
            message: String::new(),
        });
        assert_eq!(err.response().map(|r| r.status), Some(500));
        assert!(ApiError::MissingContext.response().is_none());
        assert!(ApiError::from(ContextError::Canceled).is_canceled());
    }
}
