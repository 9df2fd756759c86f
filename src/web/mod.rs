// Web server: axum JSON API over the reviews dataset and topic extraction.
//
// Dataset reads go through the TTL-cached repository. Topic extraction is
// CPU-bound and always runs on the blocking pool (see offload), so health
// checks and filter queries stay responsive while a model is being fitted.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset::ReviewRepository;
use crate::topics::TopicExtractor;

pub mod error;
pub mod handlers;
pub mod offload;

pub use error::ApiError;

/// Shared application state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<ReviewRepository>,
    pub extractor: TopicExtractor,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: ReviewRepository, config: Config) -> Self {
        let extractor = TopicExtractor::with_options(&config.stopword_options());
        Self {
            repo: Arc::new(repo),
            extractor,
            config: Arc::new(config),
        }
    }
}

/// Start the axum web server and block until it exits.
pub async fn run_server(config: Config) -> Result<()> {
    let repo = ReviewRepository::from_csv(config.data_path.clone(), config.cache_ttl);
    let addr = format!("{}:{}", config.bind, config.port);
    let state = AppState::new(repo, config);

    // Warm the cache; a failure here shows up on /health instead of killing
    // the process.
    match state.repo.get().await {
        Ok(reviews) => info!(reviews = reviews.len(), "Dataset loaded"),
        Err(e) => warn!(error = %format!("{e:#}"), "Dataset not loaded at startup"),
    }

    let app = build_router(state);
    info!("stayscope API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/stats", get(handlers::dataset::get_stats))
        .route("/hotels", get(handlers::dataset::list_hotels))
        .route("/nationalities", get(handlers::dataset::list_nationalities))
        .route("/reviews/filter", post(handlers::dataset::filter_reviews))
        .route("/reviews/analyze", post(handlers::reviews::analyze_review))
        .route("/reviews/topics", post(handlers::topics::aggregated_topics))
        .route("/reviews/wordcloud", post(handlers::reviews::word_cloud))
        .route("/metrics/aggregated", post(handlers::metrics::aggregated))
        .route("/metrics/distribution", post(handlers::metrics::distribution))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /: service description and endpoint index.
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "stayscope",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
        "endpoints": {
            "GET /health": "Health check",
            "GET /stats": "Dataset statistics",
            "GET /hotels": "Hotel names",
            "GET /nationalities": "Reviewer nationalities",
            "POST /reviews/filter": "Filtered reviews",
            "POST /reviews/analyze": "Topics for a single review",
            "POST /reviews/topics": "Topics per sentiment",
            "POST /reviews/wordcloud": "Word frequencies",
            "POST /metrics/aggregated": "Aggregated metrics",
            "POST /metrics/distribution": "Distribution of one metric",
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /health: always 200; the body says whether the dataset is usable.
async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match state.repo.get().await {
        Ok(reviews) => {
            let cache_age = state.repo.age().await.map(|age| age.as_secs_f64());
            Json(serde_json::json!({
                "status": "healthy",
                "dataset_loaded": true,
                "total_reviews": reviews.len(),
                "cache_age_seconds": cache_age,
                "timestamp": timestamp,
            }))
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Health check failed");
            Json(serde_json::json!({
                "status": "unhealthy",
                "dataset_loaded": false,
                "error": format!("{e:#}"),
                "timestamp": timestamp,
            }))
        }
    }
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
