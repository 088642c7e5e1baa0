//! In-process stand-in for the transit API, used by the client's tests.
//!
//! Every route lives under [`BASE_PATH`] and answers `<name>.json` the way
//! the real service does. Requests without an `api-key` query parameter are
//! rejected with the same `responseText` error envelope the service uses.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Query, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub const BASE_PATH: &str = "/v3";
pub const API_KEY_PARAM: &str = "api-key";
pub const RAW_BODY: &str = "Hello from the other side !";
pub const LARGE_BODY_LEN: usize = 64 * 1024;
pub const SLOW_DELAY: Duration = Duration::from_secs(5);

/// What the server saw, reported back by `echo.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
}

pub fn app() -> Router {
    let api = Router::new()
        .route("/echo.json", get(echo))
        .route("/stops.json", get(stops))
        .route("/error.json", get(bad_query))
        .route("/plain-error.json", get(plain_error))
        .route("/empty.json", get(no_content))
        .route("/raw.json", get(raw))
        .route("/malformed.json", get(malformed))
        .route("/large.json", get(large))
        .route("/redirect.json", get(redirect_loop))
        .route("/slow.json", get(slow))
        .route_layer(middleware::from_fn(require_api_key));

    Router::new().nest(BASE_PATH, api).fallback(unrouted)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock transit API listening");
    }
    axum::serve(listener, app()).await
}

async fn require_api_key(
    Query(params): Query<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Response {
    match params.get(API_KEY_PARAM) {
        Some(key) if !key.is_empty() => next.run(request).await,
        _ => {
            warn!(path = %request.uri().path(), "request without api-key");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "responseText": "an api-key is required" })),
            )
                .into_response()
        }
    }
}

async fn echo(
    OriginalUri(uri): OriginalUri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Json<Echo> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(Echo {
        path: uri.path().to_string(),
        query,
        user_agent: header_value(header::USER_AGENT),
        content_type: header_value(header::CONTENT_TYPE),
    })
}

async fn stops() -> Json<serde_json::Value> {
    Json(json!({
        "stops": [
            {
                "key": 10064,
                "name": "Northbound Osborne at Stradbrook",
                "number": 10064,
                "direction": "Northbound",
                "side": "Nearside",
                "street": { "key": 2715, "name": "Osborne Street", "type": "Street" },
                "cross-street": { "key": 3560, "name": "Stradbrook Avenue", "type": "Avenue" },
                "centre": {
                    "utm": { "zone": "14U", "x": 633838, "y": 5525742 },
                    "geographic": { "latitude": "49.87499", "longitude": "-97.14429" }
                }
            }
        ],
        "query-time": "2026-10-17T09:15:00"
    }))
}

async fn bad_query() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "responseText": "bad query" })),
    )
}

async fn plain_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn raw() -> &'static str {
    RAW_BODY
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"stops": ["#)
}

async fn large() -> String {
    "x".repeat(LARGE_BODY_LEN)
}

async fn redirect_loop(OriginalUri(uri): OriginalUri) -> Redirect {
    Redirect::to(&uri.to_string())
}

async fn slow() -> Json<serde_json::Value> {
    debug!(delay = ?SLOW_DELAY, "holding slow response");
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({}))
}

async fn unrouted(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    warn!(path = %uri.path(), "request outside the API base path");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("base path {BASE_PATH} is not preserved in the request URL {}", uri.path()),
    )
}
