//! The request pipeline.
//!
//! # Design
//! `RequestClient::request` walks a fixed sequence: resolve options and
//! headers, normalize and encode params, arm the timeout, run
//! `before_request`, call the transport, classify, accept or reject, handle
//! errors, run `after_request`. Every failure after the before-hook is
//! folded into the returned `ResponseResult`; the caller only sees `Err`
//! for configuration errors and a failing before-hook.
//!
//! The timeout timer is a guard: it cancels the call's signal when it
//! fires and is disarmed when dropped, so it never outlives the call on any
//! exit path.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::classify::classify;
use crate::config::{self, RequestConfig};
use crate::encode::encode;
use crate::error::{RequestError, TransportError};
use crate::handler::handle_error;
use crate::hooks::{Hooks, Outcome};
use crate::http::{Body, SendData};
use crate::options::RequestOptions;
use crate::params::{normalize, Params};
use crate::result::ResponseResult;
use crate::transport::{ReqwestTransport, Transport};

/// Issues requests against a config and a transport.
#[derive(Clone)]
pub struct RequestClient {
    config: Arc<RequestConfig>,
    transport: Arc<dyn Transport>,
}

impl Default for RequestClient {
    /// Global config and a fresh `reqwest` transport.
    fn default() -> Self {
        Self::with_config(config::global())
    }
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestClient {
    pub fn new(config: Arc<RequestConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Client with its own `reqwest` transport. Its connection pool belongs
    /// to the tokio runtime that first drives it; share a client only within
    /// one runtime.
    pub fn with_config(config: Arc<RequestConfig>) -> Self {
        Self::new(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Send one request and settle it into a `ResponseResult`.
    ///
    /// `path` is joined to `base_url` unless it is already absolute.
    /// `options` override the config defaults field by field.
    pub async fn request(
        &self,
        path: &str,
        params: Option<Params>,
        options: Option<RequestOptions>,
    ) -> Result<ResponseResult, RequestError> {
        let hooks = self.config.hooks();
        let defaults = self.config.defaults();
        let options = match options {
            Some(overrides) => defaults.merge(&overrides),
            None => defaults,
        };

        let send = prepare(path, params.unwrap_or_default(), &options)?;
        let _timer = TimeoutGuard::arm(options.timeout_duration(), send.signal.clone());

        let before = match &hooks.before_request {
            Some(hook) => hook
                .before_request(&send, &options)
                .await
                .map_err(RequestError::BeforeRequest)?,
            None => None,
        };

        tracing::debug!(
            request_id = %send.request_id,
            method = %send.method,
            url = %send.url,
            "sending request"
        );

        let result = match self.dispatch(&send, &options, &hooks).await {
            Outcome::Accepted(result) => result,
            Outcome::Rejected(error) if options.handles_errors() => {
                handle_error(error, &send, &options, &hooks)
                    .await
                    .into_result()
            }
            Outcome::Rejected(error) => error,
        };

        if let Some(hook) = &hooks.after_request {
            hook.after_request(before.as_deref(), &result, &send, &options)
                .await;
        }

        Ok(result)
    }

    /// Network call, classification and the accept/reject decision.
    async fn dispatch(&self, send: &SendData, options: &RequestOptions, hooks: &Hooks) -> Outcome {
        let response = tokio::select! {
            biased;
            _ = send.signal.cancelled() => Err(TransportError::Aborted),
            response = self.transport.fetch(send) => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(request_id = %send.request_id, error = %err, "transport failed");
                return Outcome::Rejected(err.into());
            }
        };

        let result = classify(&response);

        if let Some(hook) = &hooks.check_status {
            return hook.check_status(result, send, options).await;
        }

        if !options.checks_status() || result.code_matches(options.success_code_or_default()) {
            Outcome::Accepted(result)
        } else {
            Outcome::Rejected(result)
        }
    }
}

/// `request` against the global config with a one-off `reqwest` transport.
///
/// No connection is reused between calls, so it is safe to call from any
/// runtime. Hosts issuing many requests should keep a `RequestClient`.
pub async fn request(
    path: &str,
    params: Option<Params>,
    options: Option<RequestOptions>,
) -> Result<ResponseResult, RequestError> {
    RequestClient::default().request(path, params, options).await
}

/// Absolute when it starts with `//`, `http://` or `https://` and has
/// something after the slashes.
pub fn is_absolute_url(path: &str) -> bool {
    let rest = path
        .strip_prefix("https:")
        .or_else(|| path.strip_prefix("http:"))
        .unwrap_or(path);
    rest.strip_prefix("//").is_some_and(|host| !host.is_empty())
}

pub fn resolve_url(base_url: &str, path: &str) -> String {
    if is_absolute_url(path) {
        path.to_string()
    } else {
        format!("{base_url}{path}")
    }
}

/// Build the send descriptor for a call.
fn prepare(path: &str, params: Params, options: &RequestOptions) -> Result<SendData, RequestError> {
    let url = resolve_url(options.base_url_or_empty(), path);
    let params = normalize(
        params,
        options.trims_params(),
        options.deletes_undefined_params(),
    );

    let mut headers = match &options.headers {
        Some(headers) => to_header_map(headers.resolve(&url, &params, options))?,
        None => HeaderMap::new(),
    };

    let method = options.method_or_default();
    let encoded = encode(&url, method, params, options)?;
    if matches!(encoded.body, Body::Multipart(_)) {
        headers.remove(CONTENT_TYPE);
    }

    Ok(SendData {
        request_id: Uuid::new_v4(),
        path: path.to_string(),
        url: encoded.url,
        method,
        headers,
        body: encoded.body,
        credentials: options.credentials(),
        cache: options.cache,
        signal: CancellationToken::new(),
    })
}

fn to_header_map(headers: BTreeMap<String, String>) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RequestError::InvalidHeaderName(name.clone()))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|_| RequestError::InvalidHeaderValue { name: name.clone() })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Cancels `signal` after the timeout unless dropped first.
struct TimeoutGuard {
    timer: Option<JoinHandle<()>>,
}

impl TimeoutGuard {
    fn arm(timeout: Option<Duration>, signal: CancellationToken) -> Self {
        let timer = timeout.map(|timeout| {
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                signal.cancel();
            })
        });
        Self { timer }
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
