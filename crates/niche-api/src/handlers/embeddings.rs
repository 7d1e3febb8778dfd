use axum::{Json, extract::State, extract::rejection::JsonRejection};
use niche_common::{
    api::{EmbeddingSimilarityRequest, EmbeddingSimilarityResponse},
    embedding::rank_candidates,
};
use tracing::{info, instrument};

use super::run_blocking;
use crate::SharedState;
use crate::error::ApiError;

/// 参照ベクトルと候補行を比較してランキング（壊れた行はスキップ）
#[instrument(skip_all)]
pub async fn rank_embeddings(
    State(state): State<SharedState>,
    payload: Result<Json<EmbeddingSimilarityRequest>, JsonRejection>,
) -> Result<Json<EmbeddingSimilarityResponse>, ApiError> {
    let Json(request) = payload?;
    let (references, rows, options) = request.validate(&state.match_config)?;
    niche_metrics::record_similarity_request("embedding");

    let response = run_blocking(move || {
        let ranking = rank_candidates(&references, &rows, &options);
        Ok(EmbeddingSimilarityResponse::new(&options, ranking))
    })
    .await?;

    niche_metrics::record_embedding_rows_skipped(response.skipped_rows);
    info!(
        matches = response.matches.len(),
        skipped_rows = response.skipped_rows,
        skipped_references = response.skipped_references,
        "embedding ranking complete"
    );

    Ok(Json(response))
}
