//! Shared helpers for the HTTP-level integration tests.

use std::path::PathBuf;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use fitplan_api::{build_app, ApiConfig};
use serde_json::Value;
use tower::ServiceExt;

pub fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models")
}

pub fn demo_app() -> Result<Router> {
    build_app(&ApiConfig {
        bind: "127.0.0.1:0".to_string(),
        model_dir: models_dir(),
        allowed_origins: Vec::new(),
    })
}

pub async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

pub async fn post_predict(app: Router, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    send(app, request).await
}
