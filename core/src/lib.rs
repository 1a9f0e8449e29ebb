//! Configurable HTTP request helper with hooks and error classification.
//!
//! # Overview
//! `request(path, params, options)` sends one HTTP call and always settles
//! it into a `ResponseResult`. Around the call it layers default options,
//! parameter normalization, payload encoding (query string, JSON or
//! multipart), response classification with reserved result codes, and a
//! two-stage error flow that notifies the user through host-supplied hooks.
//!
//! # Design
//! - Default options and hooks live in a `RequestConfig`; a process-wide one
//!   backs the free functions, and clients can carry their own.
//! - Parameters are a closed variant (`Params`) resolved once up front.
//! - Hooks are optional capabilities behind `Arc`; required notifiers fall
//!   back to `tracing` warnings.
//! - The network sits behind the `Transport` trait, `reqwest` by default.
//! - No retries: one network call per request.

pub mod classify;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod http;
pub mod options;
pub mod params;
pub mod result;
pub mod status;
pub mod transport;

pub use client::{request, RequestClient};
pub use config::{
    global, request_defaults, request_hooks, set_request_defaults, set_request_hooks,
    RequestConfig,
};
pub use error::{BoxError, RequestError, TransportError};
pub use hooks::{
    AfterRequest, BeforeRequest, BeforeState, CheckStatus, ErrorNotifier, Hooks, HooksPatch,
    NetworkStatus, OnError, Outcome, RequestLogger,
};
pub use http::{Body, CacheMode, CredentialsMode, HttpMethod, SendData, TransportResponse};
pub use options::{ErrorType, HeadersOption, RequestOptions};
pub use params::{FilePart, FormBody, FormField, ParamMap, ParamValue, Params};
pub use result::{ResponseResult, ResultCode};
pub use status::RequestStatus;
pub use transport::{ReqwestTransport, Transport};
