use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub cookie: Option<String>,
    pub cache_control: Option<String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/echo", any(echo))
        .route("/text", get(text))
        .route("/status/{code}", any(bare_status))
        .route("/json-status/{code}", any(json_status))
        .route("/app/{code}", any(app_code))
        .route("/slow/{ms}", any(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(data: Value) -> Json<Value> {
    Json(json!({"code": 200, "message": "ok", "data": data}))
}

async fn ok() -> Json<Value> {
    success(json!({"id": 1, "title": "fixture"}))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let echo = Echo {
        method: method.to_string(),
        query: uri.query().map(str::to_string),
        content_type: header(header::CONTENT_TYPE),
        cookie: header(header::COOKIE),
        cache_control: header(header::CACHE_CONTROL),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    success(json!(echo))
}

async fn text() -> &'static str {
    "plain text response"
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Status code with an empty body.
async fn bare_status(Path(code): Path<u16>) -> StatusCode {
    status_from(code)
}

/// Status code with a JSON body that carries no application code.
async fn json_status(Path(code): Path<u16>) -> impl IntoResponse {
    (
        status_from(code),
        Json(json!({"message": "upstream failure"})),
    )
}

/// HTTP 200 carrying an application error code.
async fn app_code(Path(code): Path<i64>) -> Json<Value> {
    Json(json!({"code": code, "message": "application error"}))
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    success(json!({"delayed": ms}))
}
