use std::sync::atomic::Ordering;

use axum::{Json, extract::State};
use serde_json::json;
use tokio::time::{Duration, timeout};

use super::run_blocking;
use crate::SharedState;
use crate::error::ApiError;

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let store = state.store.clone();
    let candidates = timeout(READINESS_TIMEOUT, run_blocking(move || Ok(store.count()?)))
        .await
        .map_err(|_| ApiError::ServiceUnavailable("store_timeout".into()))?
        .map_err(|err| ApiError::ServiceUnavailable(format!("store check failed: {err}")))?;

    Ok(Json(json!({
        "status": "ok",
        "candidates": candidates,
        "application": env!("CARGO_PKG_NAME"),
    })))
}
