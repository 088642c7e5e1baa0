//! Request construction and dispatch against the transit API.
//!
//! # Design
//! `Client` holds the shared transport and an immutable [`ClientConfig`];
//! it is cheap to clone and safe to use from many tasks at once. A call is
//! split the same way on every endpoint:
//!
//! - [`Client::new_request`] resolves `<path>.json` against the base URL,
//!   adds the credential and the standard headers.
//! - [`Client::bare_do`] performs the round-trip and hands back the live
//!   transport response for callers that want to stream the body.
//! - [`Client::execute`] checks the status, decodes or copies the body into
//!   a [`Target`], then drains and releases the body on every path.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::io::AsyncWrite;
use tracing::debug;

use crate::body::{copy_to, drain, read_to_end, CopyError};
use crate::config::{ClientConfig, API_KEY_PARAM};
use crate::context::Context;
use crate::error::{check_response, ApiError};
use crate::http::{HttpMethod, Request, Response};
use crate::sanitize::{redact_url, sanitize_url};

/// Where [`Client::execute`] puts a successful response body.
pub enum Target<'a, T> {
    /// Ignore the body.
    Discard,
    /// Copy the body verbatim, without JSON interpretation.
    Raw(&'a mut (dyn AsyncWrite + Unpin + Send)),
    /// Decode the body as JSON. An empty body leaves the value untouched.
    Json(&'a mut T),
}

impl<'a> Target<'a, IgnoredAny> {
    pub fn discard() -> Self {
        Target::Discard
    }

    pub fn raw(sink: &'a mut (dyn AsyncWrite + Unpin + Send)) -> Self {
        Target::Raw(sink)
    }
}

impl<'a, T: DeserializeOwned> Target<'a, T> {
    pub fn json(value: &'a mut T) -> Self {
        Target::Json(value)
    }
}

/// Async client for the transit API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Client for the public API with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::new(api_key)?)
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::BuildTransport)?;
        Ok(Self::with_transport(config, http))
    }

    /// Use a caller-supplied transport, e.g. one with custom pool or TLS
    /// settings.
    pub fn with_transport(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request for `path`, which is resolved relative to the base
    /// URL after appending `.json`. `path` must not start with `/`.
    ///
    /// The context is required; passing `None` is an error.
    pub fn new_request(
        &self,
        ctx: Option<&Context>,
        method: HttpMethod,
        path: &str,
    ) -> Result<Request, ApiError> {
        let ctx = ctx.ok_or(ApiError::MissingContext)?;

        let base = &self.config.base_url;
        if !base.path().ends_with('/') {
            return Err(ApiError::MissingTrailingSlash(base.to_string()));
        }
        if path.starts_with('/') {
            return Err(ApiError::AbsolutePath(path.to_string()));
        }

        let mut url = base
            .join(&format!("{path}.json"))
            .map_err(ApiError::InvalidPath)?;
        if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
            return Err(ApiError::OutsideBaseUrl(path.to_string()));
        }
        if !self.config.api_key.is_empty() {
            url.query_pairs_mut()
                .append_pair(API_KEY_PARAM, &self.config.api_key);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.config.user_agent.is_empty() {
            headers.insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);
        }

        Ok(Request {
            method,
            url,
            headers,
            context: ctx.clone(),
        })
    }

    /// Send `req` and return the transport response with its body unread.
    ///
    /// The caller owns the body from here on. If the request's context is
    /// canceled or expires first, the context error is returned instead of
    /// whatever the transport reported.
    pub async fn bare_do(&self, req: Request) -> Result<reqwest::Response, ApiError> {
        let Request {
            method,
            url,
            headers,
            context,
        } = req;

        if let Some(err) = context.err() {
            return Err(err.into());
        }

        debug!(%method, url = %sanitize_url(&url), "dispatching request");
        let send = self.http.request(method.into(), url).headers(headers).send();

        let resp = tokio::select! {
            biased;
            err = context.done() => Err(ApiError::Canceled(err)),
            result = send => result.map_err(|err| classify_transport_error(&context, err)),
        }?;

        debug!(status = resp.status().as_u16(), "received response");
        Ok(resp)
    }

    /// Send `req`, validate the status and deliver the body into `target`.
    ///
    /// Status and decode errors still carry the [`Response`] (see
    /// [`ApiError::response`]). Whatever happens, the body is drained and
    /// released before this returns.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        req: Request,
        target: Target<'_, T>,
    ) -> Result<Response, ApiError> {
        let method = req.method;
        let mut resp = self.bare_do(req).await?;
        let meta = Response::from_transport(method, &resp);

        let outcome = deliver(&mut resp, &meta, target).await;
        drain(resp).await;
        outcome.map(|()| meta)
    }

    /// GET `path` and decode it into a fresh `T`.
    pub async fn get_json<T: DeserializeOwned + Default>(
        &self,
        ctx: &Context,
        path: &str,
    ) -> Result<(T, Response), ApiError> {
        let req = self.new_request(Some(ctx), HttpMethod::Get, path)?;
        let mut value = T::default();
        let resp = self.execute(req, Target::json(&mut value)).await?;
        Ok((value, resp))
    }
}

fn classify_transport_error(context: &Context, err: reqwest::Error) -> ApiError {
    if let Some(ctx_err) = context.err() {
        return ApiError::Canceled(ctx_err);
    }
    ApiError::Transport(redact_transport_error(err))
}

fn redact_transport_error(mut err: reqwest::Error) -> reqwest::Error {
    if let Some(url) = err.url_mut() {
        redact_url(url);
    }
    err
}

async fn deliver<T: DeserializeOwned>(
    resp: &mut reqwest::Response,
    meta: &Response,
    target: Target<'_, T>,
) -> Result<(), ApiError> {
    check_response(resp, meta).await?;

    let body_error = |source| ApiError::Body {
        response: meta.clone(),
        source: redact_transport_error(source),
    };

    match target {
        Target::Discard => Ok(()),
        Target::Raw(sink) => match copy_to(resp, sink).await {
            Ok(_) => Ok(()),
            Err(CopyError::Read(source)) => Err(body_error(source)),
            Err(CopyError::Write(source)) => Err(ApiError::Sink {
                response: meta.clone(),
                source,
            }),
        },
        Target::Json(value) => {
            let data = read_to_end(resp).await.map_err(body_error)?;
            decode_json(&data, value).map_err(|source| ApiError::Decode {
                response: meta.clone(),
                source,
            })
        }
    }
}

/// Decode the first JSON value in `data` into `value`. Empty or
/// whitespace-only input leaves `value` as it was.
fn decode_json<T: DeserializeOwned>(data: &[u8], value: &mut T) -> Result<(), serde_json::Error> {
    match serde_json::Deserializer::from_slice(data).into_iter::<T>().next() {
        Some(decoded) => {
            *value = decoded?;
            Ok(())
        }
        None => Ok(()),
    }
}
