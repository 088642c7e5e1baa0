//! Client configuration.
//!
//! A `ClientConfig` is built once, handed to [`crate::Client`] and never
//! mutated afterwards. Tests point `base_url` at the mock server through
//! [`ClientConfig::with_base_url`].

use std::fmt;

use tracing::debug;
use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.winnipegtransit.com/v3/";
pub const DEFAULT_USER_AGENT: &str = "winnipeg-transit-rs";

/// Query parameter that carries the credential on every request.
pub const API_KEY_PARAM: &str = "api-key";

pub const API_KEY_ENV: &str = "TRANSIT_API_KEY";
pub const BASE_URL_ENV: &str = "TRANSIT_BASE_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root every relative request path is resolved against. Must end in `/`.
    pub base_url: Url,
    /// Sent as `User-Agent` unless empty.
    pub user_agent: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_BASE_URL).map_err(ApiError::InvalidBaseUrl)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Read the credential from `TRANSIT_API_KEY` and, if set, the base URL
    /// from `TRANSIT_BASE_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingApiKey)?;
        let config = Self::new(api_key)?;
        match std::env::var(BASE_URL_ENV) {
            Ok(base) if !base.is_empty() => {
                debug!(base_url = %base, "base URL overridden from environment");
                config.with_base_url(&base)
            }
            _ => Ok(config),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ApiError> {
        self.base_url = Url::parse(base_url).map_err(ApiError::InvalidBaseUrl)?;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("api_key", &crate::sanitize::REDACTED)
            .finish()
    }
}
