//! Hook capabilities invoked by the request pipeline.
//!
//! # Design
//! Each hook is a small trait held behind an `Arc`, so a `Hooks` snapshot is
//! cheap to clone for every call. The three notifiers are always present and
//! default to stubs that log a warning until the host replaces them. Every
//! other hook is optional and the pipeline checks for it explicitly.
//!
//! Synchronous notifiers and loggers are implemented for plain closures.
//! The async hooks are traits implemented by host types.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::SendData;
use crate::options::RequestOptions;
use crate::result::ResponseResult;

/// Value produced by `before_request`, handed back to `after_request`.
pub type BeforeState = Box<dyn Any + Send + Sync>;

/// Accept/reject decision about a result.
#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted(ResponseResult),
    Rejected(ResponseResult),
}

impl Outcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    pub fn into_result(self) -> ResponseResult {
        match self {
            Outcome::Accepted(result) | Outcome::Rejected(result) => result,
        }
    }
}

/// Displays or reacts to a handled error (toast, modal, login redirect).
pub trait ErrorNotifier: Send + Sync {
    fn notify(&self, error: &ResponseResult, send: &SendData, options: &RequestOptions);
}

impl<F> ErrorNotifier for F
where
    F: Fn(&ResponseResult, &SendData, &RequestOptions) + Send + Sync,
{
    fn notify(&self, error: &ResponseResult, send: &SendData, options: &RequestOptions) {
        self(error, send, options)
    }
}

/// Replaces the default rejection of the error handler.
#[async_trait]
pub trait OnError: Send + Sync {
    async fn on_error(
        &self,
        error: ResponseResult,
        send: &SendData,
        options: &RequestOptions,
    ) -> Outcome;
}

/// Decides acceptance of a classified result instead of `success_code`.
#[async_trait]
pub trait CheckStatus: Send + Sync {
    async fn check_status(
        &self,
        result: ResponseResult,
        send: &SendData,
        options: &RequestOptions,
    ) -> Outcome;
}

/// Runs before the network call, e.g. to open a loading indicator.
#[async_trait]
pub trait BeforeRequest: Send + Sync {
    async fn before_request(
        &self,
        send: &SendData,
        options: &RequestOptions,
    ) -> Result<Option<BeforeState>, BoxError>;
}

/// Runs after the call settled, successful or not.
#[async_trait]
pub trait AfterRequest: Send + Sync {
    async fn after_request(
        &self,
        before: Option<&(dyn Any + Send + Sync)>,
        result: &ResponseResult,
        send: &SendData,
        options: &RequestOptions,
    );
}

/// Receives the error handler's log line.
pub trait RequestLogger: Send + Sync {
    fn error(&self, message: &str, error: &ResponseResult);
}

impl<F> RequestLogger for F
where
    F: Fn(&str, &ResponseResult) + Send + Sync,
{
    fn error(&self, message: &str, error: &ResponseResult) {
        self(message, error)
    }
}

/// Reports whether the host currently has network connectivity.
pub trait NetworkStatus: Send + Sync {
    fn is_online(&self) -> bool;
}

impl<F> NetworkStatus for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_online(&self) -> bool {
        self()
    }
}

/// Notifier used until the host registers its own.
#[derive(Debug, Clone, Copy)]
struct UnsetNotifier {
    hook: &'static str,
}

impl ErrorNotifier for UnsetNotifier {
    fn notify(&self, error: &ResponseResult, send: &SendData, _options: &RequestOptions) {
        tracing::warn!(
            request_id = %send.request_id,
            error_message = error.message.as_deref().unwrap_or_default(),
            "{} hook is not set, register one with set_hooks",
            self.hook
        );
    }
}

/// The hook set read by every request.
#[derive(Clone)]
pub struct Hooks {
    pub open_toast: Arc<dyn ErrorNotifier>,
    pub open_modal: Arc<dyn ErrorNotifier>,
    pub on_login_invalid: Arc<dyn ErrorNotifier>,
    pub on_error: Option<Arc<dyn OnError>>,
    pub check_status: Option<Arc<dyn CheckStatus>>,
    pub before_request: Option<Arc<dyn BeforeRequest>>,
    pub after_request: Option<Arc<dyn AfterRequest>>,
    pub logger: Option<Arc<dyn RequestLogger>>,
    pub network_status: Option<Arc<dyn NetworkStatus>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            open_toast: Arc::new(UnsetNotifier { hook: "open_toast" }),
            open_modal: Arc::new(UnsetNotifier { hook: "open_modal" }),
            on_login_invalid: Arc::new(UnsetNotifier {
                hook: "on_login_invalid",
            }),
            on_error: None,
            check_status: None,
            before_request: None,
            after_request: None,
            logger: None,
            network_status: None,
        }
    }
}

impl Hooks {
    /// Shallow merge: every hook set in `patch` replaces the current one.
    pub fn apply(&mut self, patch: HooksPatch) {
        let HooksPatch {
            open_toast,
            open_modal,
            on_login_invalid,
            on_error,
            check_status,
            before_request,
            after_request,
            logger,
            network_status,
        } = patch;

        if let Some(hook) = open_toast {
            self.open_toast = hook;
        }
        if let Some(hook) = open_modal {
            self.open_modal = hook;
        }
        if let Some(hook) = on_login_invalid {
            self.on_login_invalid = hook;
        }
        self.on_error = on_error.or(self.on_error.take());
        self.check_status = check_status.or(self.check_status.take());
        self.before_request = before_request.or(self.before_request.take());
        self.after_request = after_request.or(self.after_request.take());
        self.logger = logger.or(self.logger.take());
        self.network_status = network_status.or(self.network_status.take());
    }

    /// False only when a `network_status` hook reports offline.
    pub fn is_online(&self) -> bool {
        self.network_status
            .as_ref()
            .map_or(true, |status| status.is_online())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_error", &self.on_error.is_some())
            .field("check_status", &self.check_status.is_some())
            .field("before_request", &self.before_request.is_some())
            .field("after_request", &self.after_request.is_some())
            .field("logger", &self.logger.is_some())
            .field("network_status", &self.network_status.is_some())
            .finish_non_exhaustive()
    }
}

/// Partial hook set for `set_hooks`. Unset entries keep their current value.
#[derive(Clone, Default)]
pub struct HooksPatch {
    pub open_toast: Option<Arc<dyn ErrorNotifier>>,
    pub open_modal: Option<Arc<dyn ErrorNotifier>>,
    pub on_login_invalid: Option<Arc<dyn ErrorNotifier>>,
    pub on_error: Option<Arc<dyn OnError>>,
    pub check_status: Option<Arc<dyn CheckStatus>>,
    pub before_request: Option<Arc<dyn BeforeRequest>>,
    pub after_request: Option<Arc<dyn AfterRequest>>,
    pub logger: Option<Arc<dyn RequestLogger>>,
    pub network_status: Option<Arc<dyn NetworkStatus>>,
}

impl HooksPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_toast(mut self, hook: impl ErrorNotifier + 'static) -> Self {
        self.open_toast = Some(Arc::new(hook));
        self
    }

    pub fn open_modal(mut self, hook: impl ErrorNotifier + 'static) -> Self {
        self.open_modal = Some(Arc::new(hook));
        self
    }

    pub fn on_login_invalid(mut self, hook: impl ErrorNotifier + 'static) -> Self {
        self.on_login_invalid = Some(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl OnError + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn check_status(mut self, hook: impl CheckStatus + 'static) -> Self {
        self.check_status = Some(Arc::new(hook));
        self
    }

    pub fn before_request(mut self, hook: impl BeforeRequest + 'static) -> Self {
        self.before_request = Some(Arc::new(hook));
        self
    }

    pub fn after_request(mut self, hook: impl AfterRequest + 'static) -> Self {
        self.after_request = Some(Arc::new(hook));
        self
    }

    pub fn logger(mut self, hook: impl RequestLogger + 'static) -> Self {
        self.logger = Some(Arc::new(hook));
        self
    }

    pub fn network_status(mut self, hook: impl NetworkStatus + 'static) -> Self {
        self.network_status = Some(Arc::new(hook));
        self
    }
}
