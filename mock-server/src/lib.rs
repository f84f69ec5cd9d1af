use std::{collections::BTreeMap, time::Duration};

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw for a request that hit the echo fallback.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/slow/{ms}", any(slow))
        .route("/big/{bytes}", any(big))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let form = parse_form(&body);
    tracing::debug!(%method, path = uri.path(), "echo");
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        form,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn slow(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "slow"
}

/// A plain-text body of `bytes` ASCII characters.
async fn big(Path(bytes): Path<usize>) -> String {
    "x".repeat(bytes)
}

/// Decode an `application/x-www-form-urlencoded` body. Anything that does not
/// decode is reported as an empty form.
pub fn parse_form(body: &str) -> BTreeMap<String, String> {
    serde_urlencoded::from_str(body).unwrap_or_default()
}
