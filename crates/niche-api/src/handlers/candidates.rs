use axum::{Json, extract::State, extract::rejection::JsonRejection};
use niche_common::api::{CandidateCountResponse, CandidateRequest, CandidateResponse};
use tracing::info;

use super::run_blocking;
use crate::SharedState;
use crate::error::ApiError;

pub async fn upsert_candidate(
    State(state): State<SharedState>,
    payload: Result<Json<CandidateRequest>, JsonRejection>,
) -> Result<Json<CandidateResponse>, ApiError> {
    let Json(request) = payload?;
    let record = request.validate()?;
    let candidate_id = record.candidate_id.clone();

    let store = state.store.clone();
    let (action, database_size) = run_blocking(move || {
        let action = store.upsert_candidate(record)?;
        Ok((action, store.count()?))
    })
    .await?;

    niche_metrics::record_candidate_upsert(action.into());
    info!(%candidate_id, %action, database_size, "candidate upserted");

    Ok(Json(CandidateResponse {
        success: true,
        candidate_id,
        action,
        database_size,
    }))
}

pub async fn count_candidates(
    State(state): State<SharedState>,
) -> Result<Json<CandidateCountResponse>, ApiError> {
    let store = state.store.clone();
    let database_size = run_blocking(move || Ok(store.count()?)).await?;
    Ok(Json(CandidateCountResponse { database_size }))
}
