use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};
use service_core::error::AppError;

use crate::startup::AppState;

/// Liveness check.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "simplifier-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check: the upstream provider must be usable.
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let provider = state.simplifier.provider();

    provider.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Provider readiness check failed");
        AppError::ServiceUnavailable(e.to_string())
    })?;

    Ok(Json(json!({
        "status": "ready",
        "model": provider.model()
    })))
}
