//! The normalized result every request settles with.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;
use crate::http::SendData;
use crate::status::RequestStatus;

/// Application result code. Backends send either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultCode {
    Number(i64),
    Text(String),
}

impl ResultCode {
    /// `0` and the empty string count as "no code".
    pub fn is_present(&self) -> bool {
        match self {
            ResultCode::Number(n) => *n != 0,
            ResultCode::Text(s) => !s.is_empty(),
        }
    }

    /// Lenient reading of a body's `code` field. Whole-number floats count
    /// as integers; integers beyond `i64` and non-scalar values keep their
    /// JSON text. `null` is no code.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(ResultCode::Text(s)),
            Value::Number(n) => Some(match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => ResultCode::Number(i),
                (None, Some(f))
                    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
                {
                    ResultCode::Number(f as i64)
                }
                _ => ResultCode::Text(n.to_string()),
            }),
            other => Some(ResultCode::Text(other.to_string())),
        }
    }

    /// Loose comparison with a numeric code, so `"401"` matches `401`.
    pub fn matches(&self, code: i64) -> bool {
        match self {
            ResultCode::Number(n) => *n == code,
            ResultCode::Text(s) => s.trim().parse::<i64>().ok() == Some(code),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Number(n) => write!(f, "{n}"),
            ResultCode::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResultCode {
    fn from(code: i64) -> Self {
        ResultCode::Number(code)
    }
}

impl From<RequestStatus> for ResultCode {
    fn from(status: RequestStatus) -> Self {
        ResultCode::Number(status.code())
    }
}

/// Result of a request, successful or not.
///
/// Either the JSON fields of the response body are populated, or `raw`
/// holds the unparsable body text and `code` is `MalformedData`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseResult {
    /// Only ever set by the classifier; a body field named `raw` lands in
    /// `extra`.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ResultCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other top-level fields of the response body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
    /// Attached by the error handler when the result is rejected.
    #[serde(skip)]
    pub send_data: Option<SendData>,
}

impl ResponseResult {
    /// A result carrying only a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Build a result from a parsed JSON object body.
    ///
    /// Known fields are read leniently so an unexpected type never loses
    /// the rest of the body: non-string messages keep their JSON text and
    /// `null` counts as absent. Every other field is kept in `extra`.
    pub fn from_body(mut body: serde_json::Map<String, Value>) -> Self {
        let code = body.remove("code").and_then(ResultCode::from_json);
        let status = body.remove("status").filter(|v| !v.is_null());
        let data = body.remove("data").filter(|v| !v.is_null());
        let msg = body.remove("msg").and_then(text_field);
        let message = body.remove("message").and_then(text_field);
        Self {
            raw: None,
            status,
            code,
            data,
            msg,
            message,
            extra: body,
            send_data: None,
        }
    }

    pub fn has_code(&self) -> bool {
        self.code.as_ref().is_some_and(ResultCode::is_present)
    }

    pub fn code_matches(&self, code: i64) -> bool {
        self.code.as_ref().is_some_and(|c| c.matches(code))
    }

    /// Numeric or numeric-string `status` equal to `code`.
    pub fn status_matches(&self, code: i64) -> bool {
        match &self.status {
            Some(Value::Number(n)) => n.as_i64() == Some(code),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok() == Some(code),
            _ => false,
        }
    }

    /// `message`, then `msg`.
    pub fn display_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.msg.as_deref().filter(|m| !m.is_empty()))
    }
}

fn text_field(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<TransportError> for ResponseResult {
    fn from(err: TransportError) -> Self {
        Self {
            code: Some(RequestStatus::Unknown.into()),
            ..Self::from_message(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_body_and_keeps_extra_fields() {
        let result: ResponseResult = serde_json::from_value(json!({
            "code": 200,
            "data": {"id": 1},
            "message": "ok",
            "traceId": "abc"
        }))
        .unwrap();
        assert!(result.code_matches(200));
        assert_eq!(result.data, Some(json!({"id": 1})));
        assert_eq!(result.extra.get("traceId"), Some(&json!("abc")));
        assert!(result.raw.is_none());
    }

    #[test]
    fn string_codes_compare_loosely() {
        let result: ResponseResult = serde_json::from_value(json!({"code": "401"})).unwrap();
        assert_eq!(result.code, Some(ResultCode::Text("401".to_string())));
        assert!(result.code_matches(401));
        assert!(!result.code_matches(200));
    }

    #[test]
    fn zero_and_empty_codes_are_absent() {
        assert!(!ResultCode::Number(0).is_present());
        assert!(!ResultCode::Text(String::new()).is_present());
        assert!(ResultCode::Text("E1".to_string()).is_present());
        assert!(!ResponseResult::default().has_code());
    }

    #[test]
    fn display_message_prefers_message_over_msg() {
        let mut result = ResponseResult {
            msg: Some("from msg".to_string()),
            ..ResponseResult::default()
        };
        assert_eq!(result.display_message(), Some("from msg"));
        result.message = Some("from message".to_string());
        assert_eq!(result.display_message(), Some("from message"));
    }

    #[test]
    fn codes_are_read_leniently() {
        assert_eq!(ResultCode::from_json(json!(200)), Some(ResultCode::Number(200)));
        assert_eq!(ResultCode::from_json(json!(200.0)), Some(ResultCode::Number(200)));
        assert_eq!(ResultCode::from_json(json!("E1")), Some(ResultCode::Text("E1".to_string())));
        assert_eq!(ResultCode::from_json(json!(1.5)), Some(ResultCode::Text("1.5".to_string())));
        assert_eq!(
            ResultCode::from_json(json!(u64::MAX)),
            Some(ResultCode::Text(u64::MAX.to_string()))
        );
        assert_eq!(ResultCode::from_json(json!(true)), Some(ResultCode::Text("true".to_string())));
        assert_eq!(ResultCode::from_json(json!(null)), None);
    }

    #[test]
    fn body_fields_with_unexpected_types_are_kept() {
        let body = json!({
            "code": 4100,
            "message": ["a", "b"],
            "msg": 7,
            "data": null,
            "traceId": "abc"
        });
        let serde_json::Value::Object(body) = body else {
            unreachable!()
        };
        let result = ResponseResult::from_body(body);
        assert!(result.code_matches(4100));
        assert_eq!(result.message.as_deref(), Some(r#"["a","b"]"#));
        assert_eq!(result.msg.as_deref(), Some("7"));
        assert!(result.data.is_none());
        assert_eq!(result.extra.get("traceId"), Some(&json!("abc")));
    }

    #[test]
    fn body_raw_field_is_not_the_malformed_marker() {
        let result: ResponseResult =
            serde_json::from_value(json!({"code": 200, "raw": "x"})).unwrap();
        assert!(result.raw.is_none());
        assert_eq!(result.extra.get("raw"), Some(&json!("x")));
    }

    #[test]
    fn transport_errors_become_unknown_results() {
        let result = ResponseResult::from(TransportError::Aborted);
        assert!(result.code_matches(RequestStatus::Unknown.code()));
        assert_eq!(result.message.as_deref(), Some("request aborted"));
    }

    #[test]
    fn serializes_without_empty_fields() {
        let result = ResponseResult {
            code: Some(ResultCode::Number(200)),
            ..ResponseResult::default()
        };
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"code": 200}));
    }
}
