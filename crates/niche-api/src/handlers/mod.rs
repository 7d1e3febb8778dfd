pub mod candidates;
pub mod compatibility;
pub mod embeddings;
pub mod health;
pub mod similarity;

use crate::error::ApiError;

/// Store reads/writes and engine scans are synchronous; keep them off the
/// async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}
