use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use fitplan_core::{Goal, ProfileRequest};
use fitplan_ml::load_registry;
use fitplan_observability::{AppMetrics, MetricsSnapshot};
use fitplan_router::{ErrorKind, PlanRouter, RouteError};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub model_dir: PathBuf,
    /// Empty means any origin may call the API.
    pub allowed_origins: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let bind = env::var("FITPLAN_BIND").unwrap_or_else(|_| "0.0.0.0:5001".to_string());
        let model_dir = env::var("FITPLAN_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models"));

        Self {
            bind,
            model_dir,
            allowed_origins: parse_allowed_origins(env::var("FITPLAN_ALLOWED_ORIGINS").ok()),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub router: PlanRouter,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    models_loaded: Vec<Goal>,
    metrics: MetricsSnapshot,
}

pub fn build_app(config: &ApiConfig) -> Result<Router> {
    let registry = load_registry(&config.model_dir).with_context(|| {
        format!(
            "failed to load model artifacts from {}",
            config.model_dir.display()
        )
    })?;

    let state = ApiState {
        router: PlanRouter::new(Arc::new(registry), AppMetrics::shared()),
        allowed_origins: Arc::new(config.allowed_origins.clone()),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::map_response(json_payload_too_large))
        .with_state(state)
}

/// The body limit answers in plain text before any handler runs.
async fn json_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("request body exceeds {MAX_BODY_BYTES} bytes"),
        );
    }
    response
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        models_loaded: state.router.models().goals(),
        metrics: state.router.metrics().snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let metrics = state.router.metrics();
            metrics.inc_request();
            metrics.inc_failure();
            warn!(error = %rejection.body_text(), "unreadable predict body");
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            return error_response(status, rejection.body_text());
        }
    };

    match state.router.recommend(request) {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(error) => error_response(status_for(&error), error.to_string()),
    }
}

pub fn status_for(error: &RouteError) -> StatusCode {
    match error.kind() {
        ErrorKind::Validation | ErrorKind::InvalidGoal => StatusCode::BAD_REQUEST,
        ErrorKind::UnknownCategory => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidPool | ErrorKind::Model => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn parse_allowed_origins(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
