//! Default options and hooks shared by requests.
//!
//! # Design
//! A `RequestConfig` owns the default `RequestOptions` and the `Hooks`.
//! Requests take a snapshot of both when they start and never write back;
//! only the explicit setters mutate. Writers race with last-writer-wins
//! semantics. A process-wide instance backs the free `request` function;
//! clients that need isolation (tests, multi-tenant hosts) create their own.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::hooks::{Hooks, HooksPatch};
use crate::options::RequestOptions;

static GLOBAL: Lazy<Arc<RequestConfig>> = Lazy::new(|| Arc::new(RequestConfig::new()));

/// Holder of default request options and hooks.
#[derive(Debug)]
pub struct RequestConfig {
    defaults: RwLock<RequestOptions>,
    hooks: RwLock<Hooks>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestConfig {
    /// Built-in defaults and unset hooks.
    pub fn new() -> Self {
        Self::with_defaults(RequestOptions::builtin())
    }

    pub fn with_defaults(defaults: RequestOptions) -> Self {
        Self {
            defaults: RwLock::new(defaults),
            hooks: RwLock::new(Hooks::default()),
        }
    }

    /// Snapshot of the default options.
    pub fn defaults(&self) -> RequestOptions {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Shallow-merge `partial` into the default options.
    pub fn set_defaults(&self, partial: RequestOptions) {
        let mut defaults = self
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *defaults = defaults.merge(&partial);
    }

    /// Snapshot of the hooks.
    pub fn hooks(&self) -> Hooks {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Shallow-merge `patch` into the hooks.
    pub fn set_hooks(&self, patch: HooksPatch) {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(patch);
    }
}

/// The process-wide config used by `request` and `RequestClient::default`.
pub fn global() -> Arc<RequestConfig> {
    GLOBAL.clone()
}

pub fn request_defaults() -> RequestOptions {
    GLOBAL.defaults()
}

pub fn set_request_defaults(partial: RequestOptions) {
    GLOBAL.set_defaults(partial);
}

pub fn request_hooks() -> Hooks {
    GLOBAL.hooks()
}

pub fn set_request_hooks(patch: HooksPatch) {
    GLOBAL.set_hooks(patch);
}
