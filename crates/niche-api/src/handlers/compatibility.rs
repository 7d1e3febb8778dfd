use axum::{Json, extract::rejection::JsonRejection};
use niche_common::{
    api::{CompatibilityRequest, CompatibilityResponse},
    matching::score_compatibility,
};

use crate::error::ApiError;

pub async fn company_compatibility(
    payload: Result<Json<CompatibilityRequest>, JsonRejection>,
) -> Result<Json<CompatibilityResponse>, ApiError> {
    let Json(request) = payload?;
    let query = request.validate()?;
    niche_metrics::record_similarity_request("company_compatibility");

    let compatibility = score_compatibility(
        &query.candidate,
        &query.references,
        query.candidate_embedding.as_deref(),
        query.weights.as_ref(),
    )?;

    Ok(Json(CompatibilityResponse {
        success: true,
        compatibility,
    }))
}
