//! HTTP data types exchanged between the pipeline and a transport.
//!
//! # Design
//! `SendData` is the fully resolved description of one outbound call. The
//! pipeline builds it, hooks observe it, and a `Transport` executes it; no
//! one mutates it after the before-hook runs. `TransportResponse` is the
//! inbound counterpart with the body already read, so classification is a
//! pure function over plain data.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::params::FormBody;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Purge,
    Link,
    Unlink,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Purge => "PURGE",
            HttpMethod::Link => "LINK",
            HttpMethod::Unlink => "UNLINK",
        }
    }

    /// Methods whose parameters always travel in the query string.
    pub fn is_query_only(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PURGE" => Ok(HttpMethod::Purge),
            "LINK" => Ok(HttpMethod::Link),
            "UNLINK" => Ok(HttpMethod::Unlink),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Cache mode forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

impl CacheMode {
    /// `Cache-Control` request directive for this mode, if it has one.
    pub fn cache_control(&self) -> Option<&'static str> {
        match self {
            CacheMode::NoStore => Some("no-store"),
            CacheMode::Reload | CacheMode::NoCache => Some("no-cache"),
            CacheMode::ForceCache | CacheMode::OnlyIfCached => Some("max-stale"),
            CacheMode::Default => None,
        }
    }
}

/// Whether ambient credentials (cookies) accompany the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsMode {
    Include,
    Omit,
}

/// Encoded request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    /// Serialized JSON text.
    Json(String),
    Multipart(FormBody),
}

/// The fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct SendData {
    /// Correlates log lines of one call.
    pub request_id: Uuid,
    /// Path as passed by the caller.
    pub path: String,
    /// Final URL including any query string.
    pub url: String,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Body,
    pub credentials: CredentialsMode,
    pub cache: Option<CacheMode>,
    /// Cancelled when the call must be aborted.
    pub signal: CancellationToken,
}

/// A transport response with its body fully read.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("Head".parse::<HttpMethod>(), Ok(HttpMethod::Head));
        assert_eq!("unlink".parse::<HttpMethod>(), Ok(HttpMethod::Unlink));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn method_deserializes_from_string() {
        let method: HttpMethod = serde_json::from_str(r#""post""#).unwrap();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(method.to_string(), "POST");
    }

    #[test]
    fn only_get_and_head_are_query_only() {
        assert!(HttpMethod::Get.is_query_only());
        assert!(HttpMethod::Head.is_query_only());
        assert!(!HttpMethod::Post.is_query_only());
        assert!(!HttpMethod::Delete.is_query_only());
    }

    #[test]
    fn cache_mode_deserializes_kebab_case() {
        let mode: CacheMode = serde_json::from_str(r#""no-cache""#).unwrap();
        assert_eq!(mode, CacheMode::NoCache);
        assert_eq!(mode.cache_control(), Some("no-cache"));
        assert_eq!(CacheMode::Default.cache_control(), None);
    }

    #[test]
    fn response_ok_covers_2xx_only() {
        assert!(TransportResponse::new(200, "").ok());
        assert!(TransportResponse::new(204, "").ok());
        assert!(!TransportResponse::new(304, "").ok());
        assert!(!TransportResponse::new(503, "").ok());
    }

    #[test]
    fn response_text_is_lossy() {
        let response = TransportResponse::new(200, vec![b'h', b'i', 0xff]);
        assert_eq!(response.text(), "hi\u{fffd}");
    }
}
