//! Request and response envelopes.
//!
//! `Request` is produced by [`crate::Client::new_request`] and consumed by
//! value on dispatch, so a request can never be sent twice. `Response` is
//! the metadata left over once the body has been read and released; it is
//! what callers get back on success and what status and decode errors carry.

use std::fmt;

use reqwest::header::HeaderMap;
use url::Url;

use crate::context::Context;
use crate::sanitize::sanitize_url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully resolved API request. No body is ever attached.
pub struct Request {
    pub(crate) method: HttpMethod,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) context: Context,
}

impl Request {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The full request URL, credential included. Use
    /// [`Request::sanitized_url`] for anything that gets printed.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn sanitized_url(&self) -> Url {
        sanitize_url(&self.url)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Add an endpoint-specific query parameter.
    pub fn append_query(&mut self, key: &str, value: &str) -> &mut Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.sanitized_url().as_str())
            .field("headers", &self.headers)
            .field("context", &self.context)
            .finish()
    }
}

/// Status line and headers of a completed round-trip.
///
/// `url` is the final URL after redirects with the credential redacted.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: HttpMethod,
    pub url: Url,
    pub status: u16,
    pub headers: HeaderMap,
    pub content_length: Option<u64>,
}

impl Response {
    pub fn from_transport(method: HttpMethod, resp: &reqwest::Response) -> Self {
        Self {
            method,
            url: sanitize_url(resp.url()),
            status: resp.status().as_u16(),
            headers: resp.headers().clone(),
            content_length: resp.content_length(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}
