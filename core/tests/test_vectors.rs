//! Verify encoding and classification against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector file describes inputs and the expected outcome. JSON bodies
//! are compared as parsed values, not raw strings, so key order in the
//! vectors does not matter.

use request_core::classify::classify;
use request_core::encode::encode;
use request_core::{Body, FormField, HttpMethod, Params, RequestOptions, TransportResponse};
use serde_json::Value;

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

#[test]
fn encode_test_vectors() {
    for case in cases(include_str!("../../test-vectors/encode.json")) {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        let params = Params::from_json(case["params"].clone()).unwrap();
        let options: RequestOptions = serde_json::from_value(case["options"].clone()).unwrap();
        let expected = &case["expected"];

        let encoded = encode(case["url"].as_str().unwrap(), method, params, &options)
            .unwrap_or_else(|e| panic!("{name}: encode failed: {e}"));

        assert_eq!(encoded.url, expected["url"].as_str().unwrap(), "{name}: url");

        match (expected["body"].as_str().unwrap(), &encoded.body) {
            ("empty", Body::Empty) => {}
            ("json", Body::Json(text)) => {
                let actual: Value = serde_json::from_str(text).unwrap();
                assert_eq!(actual, expected["json"], "{name}: json body");
            }
            ("multipart", Body::Multipart(form)) => {
                let actual: Vec<(String, String)> = form
                    .fields()
                    .iter()
                    .map(|(key, field)| match field {
                        FormField::Text(value) => (key.clone(), value.clone()),
                        FormField::File(_) => panic!("{name}: unexpected file field {key}"),
                    })
                    .collect();
                let expected: Vec<(String, String)> =
                    serde_json::from_value(expected["fields"].clone()).unwrap();
                assert_eq!(actual, expected, "{name}: form fields");
            }
            (kind, body) => panic!("{name}: expected {kind} body, got {body:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classify
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    for case in cases(include_str!("../../test-vectors/classify.json")) {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap().to_string();

        let result = classify(&TransportResponse::new(status, body));
        let actual = serde_json::to_value(&result).unwrap();

        for (field, expected) in case["expected"].as_object().unwrap() {
            let value = actual.get(field).unwrap_or(&Value::Null);
            assert_eq!(value, expected, "{name}: field {field}");
        }
    }
}
