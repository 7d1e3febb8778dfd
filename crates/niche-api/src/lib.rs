use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::Method,
    http::Request,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
    middleware,
    middleware::Next,
    response::Response,
    routing::{get, post},
};
use clap::Parser;
use dotenvy::dotenv;
use niche_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use niche_common::matching::MatchConfig;
use niche_common::store::{CandidateStore, InMemoryStore, JsonFileStore};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod error;
pub mod handlers;

use error::ApiError;
use handlers::{candidates, compatibility, embeddings, health, similarity};

const SHUTDOWN_DRAIN_GRACE: std::time::Duration = std::time::Duration::from_millis(200);
/// Embedding payloads carry whole vectors per row.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "niche-api", about = "HTTP API for candidate similarity scoring")]
pub struct Cli {
    /// Server port
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// JSON snapshot holding the candidate population (in-memory when omitted)
    #[arg(long, env = "NICHE_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "NICHE_CORS_ORIGINS", default_value = "http://localhost:3000")]
    pub cors_origins: String,

    /// Prometheus exporter port (disabled when omitted)
    #[arg(long, env = "NICHE_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub store_path: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub metrics_port: Option<u16>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::Configuration(
                "NICHE_CORS_ORIGINS must list explicit origins".into(),
            ));
        }

        Ok(Self {
            port: cli.port,
            store_path: cli.store_path,
            cors_origins,
            metrics_port: cli.metrics_port,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            port: 3001,
            store_path: None,
            cors_origins: vec!["http://localhost:3000".into()],
            metrics_port: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CandidateStore>,
    pub config: AppConfig,
    pub match_config: MatchConfig,
    pub readiness: Arc<AtomicBool>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn CandidateStore>, config: AppConfig, match_config: MatchConfig) -> Self {
        Self {
            store,
            config,
            match_config,
            readiness: Arc::new(AtomicBool::new(true)),
        }
    }
}

fn open_store(config: &AppConfig) -> Arc<dyn CandidateStore> {
    match &config.store_path {
        Some(path) => {
            info!(path = %path.display(), "using JSON file candidate store");
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            info!("NICHE_STORE_PATH not set; candidates are kept in memory");
            Arc::new(InMemoryStore::default())
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    error::with_request_id(request_id, next.run(req)).await
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            status = tracing::field::Empty,
        )
    });

    let api_routes = Router::new()
        .route("/similarity", post(similarity::find_similar))
        .route("/candidates", post(candidates::upsert_candidate))
        .route("/candidates/count", get(candidates::count_candidates))
        .route(
            "/embedding-similarity",
            post(embeddings::rank_embeddings),
        )
        .route(
            "/company-compatibility",
            post(compatibility::company_compatibility),
        );

    Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid::default(),
        ))
        .layer(cors)
        .with_state(state)
}

/// In-memory state for router tests.
pub fn test_state(store: InMemoryStore) -> SharedState {
    Arc::new(AppState::new(
        Arc::new(store),
        AppConfig::for_tests(),
        MatchConfig::default(),
    ))
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;
    let match_config = MatchConfig::from_env();

    if let Some(port) = config.metrics_port {
        niche_metrics::init_metrics(port);
    }

    let store = open_store(&config);
    let population = store.count()?;
    let state = Arc::new(AppState::new(store, config.clone(), match_config));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(
        %addr,
        population,
        default_top_k = match_config.default_top_k,
        max_top_k = match_config.max_top_k,
        aggregation = %match_config.embedding_aggregation,
        "niche-api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.readiness.store(false, Ordering::SeqCst);
    info!("shutdown requested; draining");

    // Let load balancers observe /readyz as not ready before the listener closes.
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}
