//! Verify `build_action` / `parse_action` against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each case describes the action input, the exact request the client must
//! produce, a simulated response, and either the expected result or the
//! expected error kind. Bodies are compared as raw strings because the
//! payload must reach the wire unchanged.

use ckan_core::{ActionRequest, CkanClient, Endpoint, ErrorKind, HttpMethod, HttpResponse};

const BASE_URL: &str = "http://localhost:3000";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "Transport" => ErrorKind::Transport,
        "Status" => ErrorKind::Status,
        "Parse" => ErrorKind::Parse,
        "Application" => ErrorKind::Application,
        "Serialization" => ErrorKind::Serialization,
        other => panic!("unknown error kind: {other}"),
    }
}

#[test]
fn action_test_vectors() {
    let raw = include_str!("../../test-vectors/actions.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let mut endpoint = Endpoint::new(BASE_URL);
        if let Some(key) = case["api_key"].as_str() {
            endpoint = endpoint.with_api_key(key);
        }
        let client = CkanClient::new(endpoint);

        let action = case["action"].as_str().unwrap();
        let request = match case["payload"].as_str() {
            Some(payload) => ActionRequest::with_raw_payload(action, payload),
            None => ActionRequest::new(action),
        };
        let expected_req = &case["expected_request"];

        // Verify build
        let req = client.build_action(&request);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
        assert_eq!(req.body.as_deref(), expected_req["body"].as_str(), "{name}: body");

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );
        let result = client.parse_action(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), parse_kind(expected_error.as_str().unwrap()), "{name}: error kind");
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
