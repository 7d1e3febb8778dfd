use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const SIMILARITY_REQUESTS_TOTAL: &str = "niche_similarity_requests_total";
pub const EMBEDDING_ROWS_SKIPPED_TOTAL: &str = "niche_embedding_rows_skipped_total";
pub const CANDIDATES_UPSERTED_TOTAL: &str = "niche_candidates_upserted_total";

/// `0.0.0.0:<port>` で Prometheus エクスポーターを起動
///
/// Must run inside a tokio runtime; the scrape listener is spawned onto it.
/// Calling again returns the first handle without binding a second listener.
pub fn init_metrics(port: u16) -> Option<&'static PrometheusHandle> {
    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    let (recorder, exporter) = match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .build()
    {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to build prometheus exporter");
            return None;
        }
    };

    let handle = recorder.handle();
    if let Err(err) = metrics::set_global_recorder(recorder) {
        warn!(error = %err, "metrics recorder already installed");
        return None;
    }

    tokio::spawn(async move {
        if exporter.await.is_err() {
            warn!("prometheus exporter stopped");
        }
    });

    let _ = PROMETHEUS_HANDLE.set(handle);
    describe();
    info!(metrics_port = port, "started prometheus exporter");
    PROMETHEUS_HANDLE.get()
}

fn describe() {
    metrics::describe_counter!(
        SIMILARITY_REQUESTS_TOTAL,
        "Similarity requests served, by route"
    );
    metrics::describe_counter!(
        EMBEDDING_ROWS_SKIPPED_TOTAL,
        "Embedding rows dropped because they did not decode"
    );
    metrics::describe_counter!(
        CANDIDATES_UPSERTED_TOTAL,
        "Candidates written to the store, by action"
    );
}

// Without an installed recorder these are no-ops.

pub fn record_similarity_request(route: &'static str) {
    metrics::counter!(SIMILARITY_REQUESTS_TOTAL, "route" => route).increment(1);
}

pub fn record_embedding_rows_skipped(rows: usize) {
    if rows > 0 {
        metrics::counter!(EMBEDDING_ROWS_SKIPPED_TOTAL).increment(rows as u64);
    }
}

pub fn record_candidate_upsert(action: &'static str) {
    metrics::counter!(CANDIDATES_UPSERTED_TOTAL, "action" => action).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_harmless() {
        record_similarity_request("similarity");
        record_embedding_rows_skipped(0);
        record_embedding_rows_skipped(3);
        record_candidate_upsert("added");
    }

    #[tokio::test]
    async fn init_metrics_spawns_exporter_once() {
        let first = init_metrics(0).map(|handle| handle as *const PrometheusHandle);
        let second = init_metrics(0).map(|handle| handle as *const PrometheusHandle);

        assert!(first.is_some());
        assert_eq!(first, second);

        record_candidate_upsert("added");
        let rendered = PROMETHEUS_HANDLE.get().map(PrometheusHandle::render).unwrap_or_default();
        assert!(rendered.contains(CANDIDATES_UPSERTED_TOTAL));
    }
}
