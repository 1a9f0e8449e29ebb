//! Payload encoding: query string, multipart form or JSON body.
//!
//! # Design
//! Selection follows a fixed priority: `use_query_params` or a GET/HEAD
//! method puts everything in the query string; otherwise `form_data`
//! produces a multipart body; otherwise the parameters become a JSON body.
//! Nested values are flattened with bracket notation (`a[b][0]`) for both
//! the query string and the form. Only mappings are merged with
//! `default_params`.

use url::form_urlencoded;

use crate::error::RequestError;
use crate::http::{Body, HttpMethod};
use crate::options::RequestOptions;
use crate::params::{map_to_json, FormBody, FormField, ParamMap, ParamValue, Params};

/// Name of the timestamp parameter added by `add_time_stamp`.
pub const TIMESTAMP_PARAM: &str = "t";

/// Final URL and body of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub url: String,
    pub body: Body,
}

/// Encode normalized `params` for `method` according to `options`.
pub fn encode(
    url: &str,
    method: HttpMethod,
    params: Params,
    options: &RequestOptions,
) -> Result<Encoded, RequestError> {
    let timestamp = options
        .adds_time_stamp()
        .then(|| chrono::Utc::now().timestamp_millis());
    let params = merge_defaults(params, options.default_params.as_ref(), timestamp);

    if options.uses_query_params() || method.is_query_only() {
        return Ok(Encoded {
            url: append_query(url, &query_string(&params)),
            body: Body::Empty,
        });
    }

    let body = if options.uses_form_data() {
        Body::Multipart(to_form(params))
    } else {
        Body::Json(to_json(&params)?)
    };

    Ok(Encoded {
        url: url.to_string(),
        body,
    })
}

/// Lay a mapping over `defaults`; caller values win. Other shapes are
/// returned unchanged.
pub fn merge_defaults(
    params: Params,
    defaults: Option<&serde_json::Map<String, serde_json::Value>>,
    timestamp: Option<i64>,
) -> Params {
    match params {
        Params::Mapping(map) => {
            let mut merged: ParamMap = defaults
                .into_iter()
                .flatten()
                .map(|(k, v)| (k.clone(), ParamValue::from(v.clone())))
                .collect();
            if let Some(ts) = timestamp {
                merged.insert(TIMESTAMP_PARAM.to_string(), ts.into());
            }
            merged.extend(map);
            Params::Mapping(merged)
        }
        other => other,
    }
}

/// `?`-prefixed, form-urlencoded query. Empty when there is nothing to send.
pub fn query_string(params: &Params) -> String {
    let mut pairs = Vec::new();
    match params {
        Params::Mapping(map) => flatten_map(map, "", &mut pairs),
        Params::Sequence(items) => flatten_items(items, "", &mut pairs),
        Params::Form(form) => pairs.extend(form.fields().iter().cloned()),
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, field) in &pairs {
        match field {
            FormField::Text(value) => {
                serializer.append_pair(key, value);
            }
            // Files cannot travel in a URL.
            FormField::File(_) => {}
        }
    }
    let query = serializer.finish();
    if query.is_empty() {
        query
    } else {
        format!("?{query}")
    }
}

fn append_query(url: &str, query: &str) -> String {
    match query.strip_prefix('?') {
        Some(rest) if url.contains('?') => format!("{url}&{rest}"),
        _ => format!("{url}{query}"),
    }
}

/// Convert params to multipart fields. Forms are used as they are.
pub fn to_form(params: Params) -> FormBody {
    let mut fields = Vec::new();
    match params {
        Params::Form(form) => return form,
        Params::Mapping(map) => flatten_map(&map, "", &mut fields),
        Params::Sequence(items) => flatten_items(&items, "", &mut fields),
    }
    let mut form = FormBody::new();
    for (name, field) in fields {
        form.append(name, field);
    }
    form
}

/// JSON text of the params. A form has no JSON shape and encodes as `{}`.
pub fn to_json(params: &Params) -> Result<String, RequestError> {
    let value = match params {
        Params::Mapping(map) => serde_json::Value::Object(map_to_json(map)),
        Params::Sequence(items) => ParamValue::Array(items.clone())
            .to_json()
            .unwrap_or(serde_json::Value::Null),
        Params::Form(_) => serde_json::Value::Object(serde_json::Map::new()),
    };
    Ok(serde_json::to_string(&value)?)
}

fn child_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}[{key}]")
    }
}

fn flatten_map(map: &ParamMap, parent: &str, out: &mut Vec<(String, FormField)>) {
    for (key, value) in map {
        flatten_value(value, child_key(parent, key), out);
    }
}

fn flatten_items(items: &[ParamValue], parent: &str, out: &mut Vec<(String, FormField)>) {
    for (index, value) in items.iter().enumerate() {
        flatten_value(value, child_key(parent, &index.to_string()), out);
    }
}

fn flatten_value(value: &ParamValue, key: String, out: &mut Vec<(String, FormField)>) {
    match value {
        ParamValue::Undefined => {}
        ParamValue::Null => out.push((key, FormField::Text("null".to_string()))),
        ParamValue::Bool(b) => out.push((key, FormField::Text(b.to_string()))),
        ParamValue::Number(n) => out.push((key, FormField::Text(n.to_string()))),
        ParamValue::String(s) => out.push((key, FormField::Text(s.clone()))),
        ParamValue::File(file) => out.push((key, FormField::File(file.clone()))),
        ParamValue::Array(items) => flatten_items(items, &key, out),
        ParamValue::Object(map) => flatten_map(map, &key, out),
    }
}
