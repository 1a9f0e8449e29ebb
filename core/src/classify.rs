//! Turns a transport response into a `ResponseResult`.
//!
//! Classification never fails. A body that is not a JSON object is kept as
//! `raw` text under the `MalformedData` code; a JSON object is read field by
//! field without rejecting unexpected types. A non-2xx status without an
//! application code is stamped with `BadStatus`.

use serde_json::Value;

use crate::http::TransportResponse;
use crate::result::ResponseResult;
use crate::status::{messages, RequestStatus};

pub fn classify(response: &TransportResponse) -> ResponseResult {
    let mut result = match response.json::<Value>() {
        Ok(Value::Object(body)) => ResponseResult::from_body(body),
        Ok(_) => {
            tracing::debug!(status = response.status, "response body is not a JSON object");
            malformed(response.text())
        }
        Err(err) => {
            tracing::debug!(status = response.status, error = %err, "response body is not JSON");
            malformed(response.text())
        }
    };

    if result.status.is_none() {
        result.status = Some(Value::from(response.status));
    }

    if !response.ok() && !result.has_code() {
        result.code = Some(RequestStatus::BadStatus.into());
        let prefix = result.message.take().unwrap_or_default();
        result.message = Some(
            format!("{prefix} {} {}", messages::STATUS_SUFFIX, response.status)
                .trim_start()
                .to_string(),
        );
    }

    result
}

fn malformed(raw: String) -> ResponseResult {
    ResponseResult {
        raw: Some(raw),
        code: Some(RequestStatus::MalformedData.into()),
        message: Some(messages::NOT_JSON.to_string()),
        ..ResponseResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_is_parsed() {
        let response =
            TransportResponse::new(200, r#"{"code":200,"data":{"id":7},"message":"ok"}"#);
        let result = classify(&response);
        assert!(result.code_matches(200));
        assert_eq!(result.data, Some(json!({"id": 7})));
        assert!(result.raw.is_none());
        assert_eq!(result.status, Some(json!(200)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let result = classify(&TransportResponse::new(200, "<html>oops</html>"));
        assert!(result.code_matches(4001));
        assert_eq!(result.raw.as_deref(), Some("<html>oops</html>"));
        assert_eq!(result.message.as_deref(), Some(messages::NOT_JSON));
    }

    #[test]
    fn json_arrays_are_malformed() {
        let result = classify(&TransportResponse::new(200, "[1,2]"));
        assert!(result.code_matches(4001));
        assert_eq!(result.raw.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn bad_status_without_code_is_stamped() {
        let result = classify(&TransportResponse::new(404, r#"{"message":"not here"}"#));
        assert!(result.code_matches(4002));
        assert_eq!(result.message.as_deref(), Some("not here status code: 404"));
    }

    #[test]
    fn bad_status_without_message() {
        let result = classify(&TransportResponse::new(500, "{}"));
        assert!(result.code_matches(4002));
        assert_eq!(result.message.as_deref(), Some("status code: 500"));
    }

    #[test]
    fn bad_status_keeps_application_code() {
        let result = classify(&TransportResponse::new(
            400,
            r#"{"code":4100,"message":"quota"}"#,
        ));
        assert!(result.code_matches(4100));
        assert_eq!(result.message.as_deref(), Some("quota"));
    }

    #[test]
    fn empty_503_keeps_malformed_code_and_transport_status() {
        let result = classify(&TransportResponse::new(503, ""));
        assert!(result.code_matches(4001));
        assert!(result.status_matches(503));
        assert_eq!(result.raw.as_deref(), Some(""));
    }

    #[test]
    fn body_status_is_not_overwritten() {
        let result = classify(&TransportResponse::new(200, r#"{"code":200,"status":"done"}"#));
        assert_eq!(result.status, Some(json!("done")));
    }

    #[test]
    fn unexpected_field_types_keep_application_code() {
        let result = classify(&TransportResponse::new(
            200,
            r#"{"code":4100,"message":["a","b"],"data":1}"#,
        ));
        assert!(result.code_matches(4100));
        assert!(result.raw.is_none());
        assert_eq!(result.message.as_deref(), Some(r#"["a","b"]"#));
        assert_eq!(result.data, Some(json!(1)));
    }

    #[test]
    fn float_success_code_is_an_integer() {
        let result = classify(&TransportResponse::new(200, r#"{"code":200.0,"data":1}"#));
        assert!(result.code_matches(200));
        assert!(result.raw.is_none());
    }

    #[test]
    fn oversized_code_is_kept_as_text() {
        let result = classify(&TransportResponse::new(400, r#"{"code":18446744073709551615}"#));
        assert_eq!(
            result.code,
            Some(crate::result::ResultCode::Text("18446744073709551615".to_string()))
        );
        assert!(result.raw.is_none());
    }

    #[test]
    fn body_raw_field_stays_in_extra() {
        let result = classify(&TransportResponse::new(200, r#"{"code":200,"raw":"x"}"#));
        assert!(result.code_matches(200));
        assert!(result.raw.is_none());
        assert_eq!(result.extra.get("raw"), Some(&json!("x")));
    }

    #[test]
    fn reclassifying_raw_text_keeps_raw() {
        let first = classify(&TransportResponse::new(200, "plain text"));
        let raw = first.raw.clone().unwrap();
        let second = classify(&TransportResponse::new(200, raw.clone()));
        assert_eq!(second.raw, first.raw);
        assert_eq!(second.raw.as_deref(), Some(raw.as_str()));
    }
}
