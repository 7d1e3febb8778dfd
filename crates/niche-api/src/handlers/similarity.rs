use axum::{Json, extract::State, extract::rejection::JsonRejection};
use niche_common::{
    CandidateRecord,
    api::{SimilarityQuery, SimilarityRequest, SimilarityResponse},
    matching::{MatchSummary, SimilarityEngine},
    store::CandidateStore,
};
use tracing::{info, instrument};

use super::run_blocking;
use crate::SharedState;
use crate::error::ApiError;

/// 類似候補者検索。`candidate_id` があればランキング後にストアへ保存
#[instrument(skip_all)]
pub async fn find_similar(
    State(state): State<SharedState>,
    payload: Result<Json<SimilarityRequest>, JsonRejection>,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let Json(request) = payload?;
    let query = request.validate(&state.match_config)?;
    niche_metrics::record_similarity_request("similarity");

    let store = state.store.clone();
    let response = run_blocking(move || rank_and_persist(store.as_ref(), query)).await?;
    Ok(Json(response))
}

fn rank_and_persist(
    store: &dyn CandidateStore,
    query: SimilarityQuery,
) -> Result<SimilarityResponse, ApiError> {
    let mut engine = SimilarityEngine::new(store.load_candidates()?);
    if !query.github_similarities.is_empty() {
        engine.apply_github_similarities(&query.github_similarities);
    }

    let matches = engine.find_similar(
        &query.skills,
        query.top_k,
        query.weights.as_ref(),
        &query.exclude_ids,
    );
    let summary = MatchSummary::from_matches(&matches);

    let mut response = SimilarityResponse {
        success: true,
        matches,
        database_size: engine.dataset_size(),
        query_skills: query.skills,
        summary,
        candidate_added: None,
        candidate_action: None,
        processed_candidate_id: None,
    };

    if let Some(candidate_id) = query.candidate_id {
        let action = store.upsert_candidate(CandidateRecord::new(candidate_id.clone(), query.skills))?;
        niche_metrics::record_candidate_upsert(action.into());
        let database_size = store.count()?;

        info!(%candidate_id, %action, database_size, "stored query candidate");
        response.candidate_added = Some(true);
        response.candidate_action = Some(action);
        response.processed_candidate_id = Some(candidate_id);
        response.database_size = database_size;
    }

    Ok(response)
}
