//! Error types for the request pipeline.
//!
//! # Design
//! `request` settles almost every failure into a `ResponseResult` so callers
//! inspect one shape. `RequestError` is reserved for the few failures that
//! happen before a network call can be described at all, plus a failing
//! `before_request` hook, which is surfaced to the caller untouched.
//! `TransportError` is what a `Transport` reports; the pipeline folds it into
//! the rejection path rather than returning it.

use thiserror::Error;

/// Boxed error returned by host-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned directly by `request`.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The `before_request` hook failed; the call was not sent.
    #[error("before_request hook failed: {0}")]
    BeforeRequest(#[source] BoxError),

    /// A configured header name could not be used on the wire.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A configured header value could not be used on the wire.
    #[error("invalid header value for {name}")]
    InvalidHeaderValue { name: String },

    /// Parameters could not be converted into a request payload.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The request body could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Serialization(err.to_string())
    }
}

/// Failures reported by a `Transport` before a response was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The call was cancelled through its signal, e.g. by the timeout timer.
    #[error("request aborted")]
    Aborted,

    /// The underlying client gave up waiting.
    #[error("request timeout")]
    Timeout,

    /// The connection could not be established or was dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// The request could not be built from the send descriptor.
    #[error("request build error: {0}")]
    Build(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::Build(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        assert_eq!(TransportError::Aborted.to_string(), "request aborted");
        assert_eq!(TransportError::Timeout.to_string(), "request timeout");
        assert_eq!(
            TransportError::Connection("refused".to_string()).to_string(),
            "connection error: refused"
        );
        assert_eq!(TransportError::Other("boom".to_string()).to_string(), "boom");
    }

    #[test]
    fn before_request_error_keeps_source() {
        let err = RequestError::BeforeRequest("loading overlay missing".into());
        assert_eq!(
            err.to_string(),
            "before_request hook failed: loading overlay missing"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn serde_json_error_maps_to_serialization() {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: RequestError = parsed.unwrap_err().into();
        assert!(matches!(err, RequestError::Serialization(_)));
    }
}
