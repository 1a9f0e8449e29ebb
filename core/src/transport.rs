//! Network transports that execute a `SendData`.
//!
//! # Design
//! The pipeline only depends on the `Transport` trait; `ReqwestTransport` is
//! the default implementation. Custom transports (test doubles, platform
//! HTTP stacks) receive the same fully resolved descriptor.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE, COOKIE};
use reqwest::multipart::{Form, Part};

use crate::error::TransportError;
use crate::http::{Body, CredentialsMode, SendData, TransportResponse};
use crate::params::{FormBody, FormField};

/// Executes a single HTTP call described by `SendData`.
///
/// Implementations may observe `send.signal` to abort early; the pipeline
/// also stops waiting once the signal fires.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, send: &SendData) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, send: &SendData) -> Result<TransportResponse, TransportError> {
        let method = reqwest::Method::from_bytes(send.method.as_str().as_bytes())
            .map_err(|e| TransportError::Build(e.to_string()))?;

        let mut headers = send.headers.clone();
        if send.credentials == CredentialsMode::Omit {
            headers.remove(COOKIE);
        }
        if let Some(directive) = send.cache.and_then(|mode| mode.cache_control()) {
            if !headers.contains_key(CACHE_CONTROL) {
                headers.insert(CACHE_CONTROL, HeaderValue::from_static(directive));
            }
        }

        let mut builder = self.client.request(method, &send.url);
        builder = match &send.body {
            Body::Empty => builder,
            Body::Json(text) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                builder.body(text.clone())
            }
            // reqwest writes the multipart content type with its boundary.
            Body::Multipart(form) => builder.multipart(to_multipart(form)?),
        };

        let response = builder.headers(headers).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(request_id = %send.request_id, status, bytes = body.len(), "response received");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_multipart(form: &FormBody) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for (name, field) in form.fields() {
        multipart = match field {
            FormField::Text(value) => multipart.text(name.clone(), value.clone()),
            FormField::File(file) => {
                let mut part = Part::bytes(file.bytes.to_vec());
                if let Some(file_name) = &file.file_name {
                    part = part.file_name(file_name.clone());
                }
                if let Some(mime) = &file.mime {
                    part = part
                        .mime_str(mime)
                        .map_err(|e| TransportError::Build(e.to_string()))?;
                }
                multipart.part(name.clone(), part)
            }
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FilePart;

    #[test]
    fn multipart_accepts_text_and_files() {
        let form = FormBody::new()
            .text("name", "demo")
            .file("doc", FilePart::new(vec![1u8]).file_name("a.bin").mime("application/octet-stream"));
        assert!(to_multipart(&form).is_ok());
    }

    #[test]
    fn multipart_rejects_invalid_mime() {
        let form = FormBody::new().file("doc", FilePart::new(vec![1u8]).mime("not a mime"));
        assert!(matches!(to_multipart(&form), Err(TransportError::Build(_))));
    }
}
