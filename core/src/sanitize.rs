//! Credential redaction for URLs that may end up in logs or error values.

use url::{form_urlencoded, Url};

use crate::config::API_KEY_PARAM;

/// Replacement written over every `api-key` value.
pub const REDACTED: &str = "REDACTED";

/// Return a copy of `url` with the `api-key` parameter redacted.
///
/// URLs without a non-empty `api-key` come back unchanged.
pub fn sanitize_url(url: &Url) -> Url {
    let mut url = url.clone();
    redact_url(&mut url);
    url
}

/// Redact the `api-key` parameter of `url` in place.
///
/// Only the raw value of matching segments is replaced; every other byte of
/// the query is kept as it was, encoding included.
pub fn redact_url(url: &mut Url) {
    let Some(query) = url.query() else {
        return;
    };

    let mut redacted = false;
    let segments: Vec<String> = query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some((raw_key, raw_value)) if !raw_value.is_empty() && is_api_key(raw_key) => {
                redacted = true;
                format!("{raw_key}={REDACTED}")
            }
            _ => segment.to_string(),
        })
        .collect();

    if redacted {
        url.set_query(Some(&segments.join("&")));
    }
}

fn is_api_key(raw_key: &str) -> bool {
    form_urlencoded::parse(raw_key.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == API_KEY_PARAM)
}
