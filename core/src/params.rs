//! Request parameter model and the normalizer.
//!
//! # Design
//! Parameters arrive in one of three shapes, resolved once here and then
//! dispatched on explicitly:
//! - `Params::Mapping`: named fields; merged with default params and
//!   normalized.
//! - `Params::Sequence`: positional values; passed through untouched.
//! - `Params::Form`: an already-built multipart form; passed through
//!   untouched.
//!
//! `ParamValue::Undefined` is distinct from `Null`: undefined fields are
//! dropped by the normalizer and skipped by every encoder, null is a real
//! value.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde_json::Value;

use crate::error::RequestError;

/// Named parameters. Keys encode in sorted order.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Undefined,
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<ParamValue>),
    Object(ParamMap),
    File(FilePart),
}

impl ParamValue {
    /// JSON rendering. `None` for undefined values, which JSON omits.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ParamValue::Undefined => None,
            ParamValue::Null => Some(Value::Null),
            ParamValue::Bool(b) => Some(Value::Bool(*b)),
            ParamValue::Number(n) => Some(Value::Number(n.clone())),
            ParamValue::String(s) => Some(Value::String(s.clone())),
            ParamValue::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
            ParamValue::Object(map) => Some(Value::Object(map_to_json(map))),
            // Binary content has no JSON form.
            ParamValue::File(_) => Some(Value::Object(serde_json::Map::new())),
        }
    }
}

pub(crate) fn map_to_json(map: &ParamMap) -> serde_json::Map<String, Value> {
    map.iter()
        .filter_map(|(key, value)| value.to_json().map(|v| (key.clone(), v)))
        .collect()
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => ParamValue::Number(n),
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => ParamValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ParamValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<FilePart> for ParamValue {
    fn from(value: FilePart) -> Self {
        ParamValue::File(value)
    }
}

/// Binary file content carried inside parameters or a form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl FilePart {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            mime: None,
            bytes: bytes.into(),
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// A field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text(String),
    File(FilePart),
}

/// Ordered multipart form fields. Repeated names are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    fields: Vec<(String, FormField)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, FormField::Text(value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.append(name, FormField::File(file));
        self
    }

    pub fn append(&mut self, name: impl Into<String>, field: FormField) {
        self.fields.push((name.into(), field));
    }

    pub fn fields(&self) -> &[(String, FormField)] {
        &self.fields
    }

    /// First field with the given name.
    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Parameters of a single call.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Mapping(ParamMap),
    Sequence(Vec<ParamValue>),
    Form(FormBody),
}

impl Default for Params {
    fn default() -> Self {
        Params::Mapping(ParamMap::new())
    }
}

impl Params {
    /// Build params from a JSON value. Objects become a mapping, arrays a
    /// sequence and `null` an empty mapping; scalars are rejected.
    pub fn from_json(value: Value) -> Result<Self, RequestError> {
        match value {
            Value::Null => Ok(Params::default()),
            Value::Object(map) => Ok(Params::Mapping(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            )),
            Value::Array(items) => Ok(Params::Sequence(items.into_iter().map(Into::into).collect())),
            other => Err(RequestError::InvalidParams(format!(
                "expected an object or array, got {other}"
            ))),
        }
    }

    pub fn as_mapping(&self) -> Option<&ParamMap> {
        match self {
            Params::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl From<ParamMap> for Params {
    fn from(map: ParamMap) -> Self {
        Params::Mapping(map)
    }
}

impl From<Vec<ParamValue>> for Params {
    fn from(items: Vec<ParamValue>) -> Self {
        Params::Sequence(items)
    }
}

impl From<FormBody> for Params {
    fn from(form: FormBody) -> Self {
        Params::Form(form)
    }
}

/// Trim top-level string fields and drop undefined fields of a mapping.
/// Sequences and forms are returned unchanged.
pub fn normalize(params: Params, trim: bool, delete_undefined: bool) -> Params {
    match params {
        Params::Mapping(map) => Params::Mapping(
            map.into_iter()
                .filter(|(_, value)| !(delete_undefined && *value == ParamValue::Undefined))
                .map(|(key, value)| match value {
                    ParamValue::String(s) if trim => (key, ParamValue::String(s.trim().to_string())),
                    other => (key, other),
                })
                .collect(),
        ),
        other => other,
    }
}
