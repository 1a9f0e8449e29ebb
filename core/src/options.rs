//! Request options and their resolution rules.
//!
//! Every field is optional so the same type serves as global defaults and as
//! per-call overrides: `merge` lays the overrides over the defaults field by
//! field, overrides winning. Accessors apply the fallback for a field that is
//! unset on both sides.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::http::{CacheMode, CredentialsMode, HttpMethod};
use crate::params::Params;
use crate::status::RequestStatus;

/// Environment variable read for the built-in `base_url`.
pub const API_BASE_ENV: &str = "API_BASE";

const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Computes headers from the resolved url, normalized params and options.
pub type HeaderFn =
    Arc<dyn Fn(&str, &Params, &RequestOptions) -> BTreeMap<String, String> + Send + Sync>;

/// Request headers, either fixed or computed per call.
#[derive(Clone)]
pub enum HeadersOption {
    Static(BTreeMap<String, String>),
    Computed(HeaderFn),
}

impl HeadersOption {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&str, &Params, &RequestOptions) -> BTreeMap<String, String> + Send + Sync + 'static,
    {
        HeadersOption::Computed(Arc::new(f))
    }

    pub fn resolve(
        &self,
        url: &str,
        params: &Params,
        options: &RequestOptions,
    ) -> BTreeMap<String, String> {
        match self {
            HeadersOption::Static(map) => map.clone(),
            HeadersOption::Computed(f) => f(url, params, options),
        }
    }
}

impl fmt::Debug for HeadersOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadersOption::Static(map) => f.debug_tuple("Static").field(map).finish(),
            HeadersOption::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl<'de> Deserialize<'de> for HeadersOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::deserialize(deserializer).map(HeadersOption::Static)
    }
}

/// How a handled error is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Toast,
    Modal,
    /// Nothing is shown.
    Silent,
}

impl<'de> Deserialize<'de> for ErrorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => Ok(ErrorType::Silent),
            Repr::Flag(true) => Ok(ErrorType::Toast),
            Repr::Name(name) => match name.as_str() {
                "toast" => Ok(ErrorType::Toast),
                "modal" => Ok(ErrorType::Modal),
                other => Err(serde::de::Error::custom(format!(
                    "unknown errorType `{other}`, expected \"toast\", \"modal\" or false"
                ))),
            },
        }
    }
}

/// Options controlling a request. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    /// Prefix for relative paths.
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
    pub method: Option<HttpMethod>,
    /// Milliseconds; zero disables the timeout.
    pub timeout: Option<u64>,
    pub headers: Option<HeadersOption>,
    pub with_credentials: Option<bool>,
    /// Force parameters into the query string for every method.
    pub use_query_params: Option<bool>,
    /// Send parameters as a multipart form.
    pub form_data: Option<bool>,
    pub handle_errors: Option<bool>,
    pub error_type: Option<ErrorType>,
    /// Compare the result code against `success_code`.
    pub check_status: Option<bool>,
    pub add_time_stamp: Option<bool>,
    /// Result code to display message.
    pub code_map: Option<BTreeMap<String, String>>,
    pub default_params: Option<serde_json::Map<String, Value>>,
    pub delete_undefined_params: Option<bool>,
    pub trim_params: Option<bool>,
    pub success_code: Option<i64>,
    pub login_invalid_code: Option<i64>,
    pub cache: Option<CacheMode>,
}

macro_rules! overlay {
    ($base:expr, $over:expr; $($field:ident),+ $(,)?) => {
        RequestOptions {
            $($field: $over.$field.clone().or_else(|| $base.$field.clone()),)+
        }
    };
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults installed in a fresh config store.
    pub fn builtin() -> Self {
        Self {
            base_url: Some(std::env::var(API_BASE_ENV).unwrap_or_default()),
            method: Some(HttpMethod::Get),
            timeout: Some(DEFAULT_TIMEOUT_MS),
            with_credentials: Some(true),
            form_data: Some(false),
            handle_errors: Some(true),
            error_type: Some(ErrorType::Toast),
            check_status: Some(true),
            delete_undefined_params: Some(true),
            trim_params: Some(true),
            cache: Some(CacheMode::NoCache),
            ..Self::default()
        }
    }

    /// Parse options from a JSON document, e.g. a config file.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Shallow merge: every field set in `overrides` replaces the one here.
    pub fn merge(&self, overrides: &RequestOptions) -> RequestOptions {
        overlay!(self, overrides;
            base_url, method, timeout, headers, with_credentials, use_query_params,
            form_data, handle_errors, error_type, check_status, add_time_stamp,
            code_map, default_params, delete_undefined_params, trim_params,
            success_code, login_invalid_code, cache,
        )
    }

    pub fn base_url_or_empty(&self) -> &str {
        self.base_url.as_deref().unwrap_or("")
    }

    pub fn method_or_default(&self) -> HttpMethod {
        self.method.unwrap_or(HttpMethod::Get)
    }

    /// `None` when the timeout is unset or zero.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.filter(|ms| *ms > 0).map(Duration::from_millis)
    }

    pub fn credentials(&self) -> CredentialsMode {
        if self.with_credentials.unwrap_or(false) {
            CredentialsMode::Include
        } else {
            CredentialsMode::Omit
        }
    }

    pub fn uses_query_params(&self) -> bool {
        self.use_query_params.unwrap_or(false)
    }

    pub fn uses_form_data(&self) -> bool {
        self.form_data.unwrap_or(false)
    }

    pub fn handles_errors(&self) -> bool {
        self.handle_errors.unwrap_or(false)
    }

    pub fn error_type_or_default(&self) -> ErrorType {
        self.error_type.unwrap_or(ErrorType::Toast)
    }

    pub fn checks_status(&self) -> bool {
        self.check_status.unwrap_or(false)
    }

    pub fn adds_time_stamp(&self) -> bool {
        self.add_time_stamp.unwrap_or(false)
    }

    pub fn deletes_undefined_params(&self) -> bool {
        self.delete_undefined_params.unwrap_or(false)
    }

    pub fn trims_params(&self) -> bool {
        self.trim_params.unwrap_or(false)
    }

    pub fn success_code_or_default(&self) -> i64 {
        self.success_code.unwrap_or(RequestStatus::Success.code())
    }

    pub fn login_invalid_code_or_default(&self) -> i64 {
        self.login_invalid_code
            .unwrap_or(RequestStatus::NotLoggedIn.code())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_timeout(mut self, millis: u64) -> Self {
        self.timeout = Some(millis);
        self
    }

    pub fn with_headers(mut self, headers: HeadersOption) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = Some(enabled);
        self
    }

    pub fn with_query_params(mut self, enabled: bool) -> Self {
        self.use_query_params = Some(enabled);
        self
    }

    pub fn with_form_data(mut self, enabled: bool) -> Self {
        self.form_data = Some(enabled);
        self
    }

    pub fn with_handle_errors(mut self, enabled: bool) -> Self {
        self.handle_errors = Some(enabled);
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    pub fn with_check_status(mut self, enabled: bool) -> Self {
        self.check_status = Some(enabled);
        self
    }

    pub fn with_time_stamp(mut self, enabled: bool) -> Self {
        self.add_time_stamp = Some(enabled);
        self
    }

    pub fn with_code_map<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.code_map = Some(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_default_params(mut self, params: serde_json::Map<String, Value>) -> Self {
        self.default_params = Some(params);
        self
    }

    pub fn with_delete_undefined_params(mut self, enabled: bool) -> Self {
        self.delete_undefined_params = Some(enabled);
        self
    }

    pub fn with_trim_params(mut self, enabled: bool) -> Self {
        self.trim_params = Some(enabled);
        self
    }

    pub fn with_success_code(mut self, code: i64) -> Self {
        self.success_code = Some(code);
        self
    }

    pub fn with_login_invalid_code(mut self, code: i64) -> Self {
        self.login_invalid_code = Some(code);
        self
    }

    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = Some(cache);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_overrides() {
        let defaults = RequestOptions::builtin().with_base_url("https://api.example.com");
        let overrides = RequestOptions::new()
            .with_method(HttpMethod::Post)
            .with_timeout(0);
        let merged = defaults.merge(&overrides);

        assert_eq!(merged.method_or_default(), HttpMethod::Post);
        assert_eq!(merged.base_url_or_empty(), "https://api.example.com");
        assert_eq!(merged.timeout_duration(), None);
        assert!(merged.handles_errors());
    }

    #[test]
    fn builtin_defaults() {
        let options = RequestOptions::builtin();
        assert_eq!(options.timeout_duration(), Some(Duration::from_secs(60)));
        assert_eq!(options.error_type_or_default(), ErrorType::Toast);
        assert!(options.checks_status());
        assert!(options.trims_params());
        assert!(options.deletes_undefined_params());
        assert!(!options.uses_form_data());
        assert_eq!(options.credentials(), CredentialsMode::Include);
        assert_eq!(options.cache, Some(CacheMode::NoCache));
    }

    #[test]
    fn unset_options_fall_back() {
        let options = RequestOptions::new();
        assert_eq!(options.method_or_default(), HttpMethod::Get);
        assert_eq!(options.success_code_or_default(), 200);
        assert_eq!(options.login_invalid_code_or_default(), 401);
        assert!(!options.handles_errors());
        assert_eq!(options.credentials(), CredentialsMode::Omit);
    }

    #[test]
    fn deserializes_camel_case_config() {
        let options = RequestOptions::from_json_str(
            r#"{
                "baseURL": "https://api.example.com",
                "method": "post",
                "timeout": 5000,
                "headers": {"X-App": "demo"},
                "useQueryParams": true,
                "errorType": false,
                "codeMap": {"4100": "Quota exceeded"},
                "defaultParams": {"lang": "en"},
                "successCode": 0,
                "cache": "no-store"
            }"#,
        )
        .unwrap();

        assert_eq!(options.base_url_or_empty(), "https://api.example.com");
        assert_eq!(options.method, Some(HttpMethod::Post));
        assert_eq!(options.timeout, Some(5000));
        assert!(options.uses_query_params());
        assert_eq!(options.error_type, Some(ErrorType::Silent));
        assert_eq!(
            options.code_map.as_ref().and_then(|m| m.get("4100")).map(String::as_str),
            Some("Quota exceeded")
        );
        assert_eq!(options.success_code_or_default(), 0);
        assert_eq!(options.cache, Some(CacheMode::NoStore));
        match options.headers {
            Some(HeadersOption::Static(map)) => assert_eq!(map["X-App"], "demo"),
            other => panic!("expected static headers, got {other:?}"),
        }
    }

    #[test]
    fn error_type_rejects_unknown_names() {
        let result = RequestOptions::from_json_str(r#"{"errorType": "banner"}"#);
        assert!(result.is_err());
        let modal = RequestOptions::from_json_str(r#"{"errorType": "modal"}"#).unwrap();
        assert_eq!(modal.error_type, Some(ErrorType::Modal));
    }

    #[test]
    fn computed_headers_see_url_and_options() {
        let headers = HeadersOption::computed(|url, _params, options| {
            let mut map = BTreeMap::new();
            map.insert("X-Url".to_string(), url.to_string());
            map.insert(
                "X-Method".to_string(),
                options.method_or_default().to_string(),
            );
            map
        });
        let options = RequestOptions::new().with_method(HttpMethod::Put);
        let resolved = headers.resolve("https://x.test/a", &Params::default(), &options);
        assert_eq!(resolved["X-Url"], "https://x.test/a");
        assert_eq!(resolved["X-Method"], "PUT");
    }
}
