//! Verify request building, URL sanitizing and status classification
//! against the JSON test vectors stored in `test-vectors/`.
//!
//! The vectors are plain data so other clients of the same API can share
//! them.

use transit_core::{
    check_response, sanitize_url, ApiError, Client, ClientConfig, Context, HttpMethod, Response,
};
use url::Url;

// ---------------------------------------------------------------------------
// Sanitize
// ---------------------------------------------------------------------------

#[test]
fn sanitize_test_vectors() {
    let raw = include_str!("../../test-vectors/sanitize.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = Url::parse(case["input"].as_str().unwrap()).unwrap();
        let expected = case["expected"].as_str().unwrap();

        assert_eq!(sanitize_url(&input).as_str(), expected, "{name}");
    }
}

// ---------------------------------------------------------------------------
// New request
// ---------------------------------------------------------------------------

#[test]
fn new_request_test_vectors() {
    let raw = include_str!("../../test-vectors/new_request.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let ctx = Context::background();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let config = ClientConfig::new(case["api_key"].as_str().unwrap())
            .unwrap()
            .with_base_url(case["base_url"].as_str().unwrap())
            .unwrap();
        let client = Client::with_config(config).unwrap();

        let result = client.new_request(Some(&ctx), HttpMethod::Get, case["path"].as_str().unwrap());

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "MissingTrailingSlash" => assert!(
                    matches!(err, ApiError::MissingTrailingSlash(_)),
                    "{name}: expected MissingTrailingSlash, got {err:?}"
                ),
                "AbsolutePath" => assert!(
                    matches!(err, ApiError::AbsolutePath(_)),
                    "{name}: expected AbsolutePath, got {err:?}"
                ),
                "OutsideBaseUrl" => assert!(
                    matches!(err, ApiError::OutsideBaseUrl(_)),
                    "{name}: expected OutsideBaseUrl, got {err:?}"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let req = result.unwrap();
            assert_eq!(req.method(), HttpMethod::Get, "{name}: method");
            assert_eq!(req.url().as_str(), case["expected_url"].as_str().unwrap(), "{name}: url");
            assert_eq!(req.headers()["content-type"], "application/json", "{name}: content-type");
        }
    }
}

// ---------------------------------------------------------------------------
// Check response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn check_response_test_vectors() {
    let raw = include_str!("../../test-vectors/check_response.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap().to_string();

        let mut resp = reqwest::Response::from(
            http::Response::builder().status(status).body(body).unwrap(),
        );
        let meta = Response::from_transport(HttpMethod::Get, &resp);
        let result = check_response(&mut resp, &meta).await;

        if case.get("expected_ok").is_some() {
            assert!(result.is_ok(), "{name}: expected success");
        } else {
            let err = result.unwrap_err();
            assert_eq!(err.response.status, status, "{name}: status");
            assert_eq!(err.message, case["expected_message"].as_str().unwrap(), "{name}: message");
            assert!(err.to_string().contains(&status.to_string()), "{name}: display");
        }
    }
}
