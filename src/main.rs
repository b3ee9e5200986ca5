// Define data modules
mod models;     // Data structures (Category, Block, DailySummary, etc.)
mod slots;      // 15-minute slot model and input validation
mod categories; // Category seed set and weight lookup
mod store;      // Storage trait + JSON file / in-memory backends
mod logic;      // Core focus scoring and trend aggregation
mod analytics;  // Per-day distributions
mod suggestions; // Rule-based improvement suggestions
mod llm;        // Optional LLM suggestions with rule-based fallback
mod config;
mod error;
mod routes_blocks;  // HTTP handlers for blocks, categories, slots
mod routes_summary; // HTTP handlers for summary, trend, suggestions, stats

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use config::Config;
use llm::LlmClient;
use store::{BlockStore, JsonStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlockStore>,
    pub llm: Option<LlmClient>,
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // blocks
        .route("/day/:date", get(routes_blocks::get_day))
        .route("/block", post(routes_blocks::upsert_block))
        .route("/bulk", post(routes_blocks::bulk_upsert))
        .route("/categories", get(routes_blocks::get_categories))
        .route("/slots", get(routes_blocks::get_slots))
        .route("/slot", get(routes_blocks::get_slot_for_time))
        // scoring
        .route("/summary/:date", get(routes_summary::get_summary))
        .route("/analytics/:date", get(routes_summary::get_analytics))
        .route("/trend", get(routes_summary::get_trend))
        .route("/ai/suggestions/:date", get(routes_summary::get_suggestions))
        .route("/stats", get(routes_summary::get_stats))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focus_ring=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();

    let store = JsonStore::open(&config.data_path)
        .with_context(|| format!("failed to open store at {}", config.data_path))?;
    tracing::info!(path = %store.path().display(), "store ready");

    let llm = LlmClient::from_config(&config)?;
    if llm.is_some() {
        tracing::info!(model = %config.llm_model, "LLM API key detected");
    } else {
        tracing::info!("LLM API key not set, rule-based suggestions only");
    }

    let state = AppState {
        store: Arc::new(store),
        llm,
    };

    let app = Router::new()
        .route("/health", get(routes_summary::health))
        .nest("/api", api_router(state))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Server running at http://{}", addr);
    tracing::info!("API base:     http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr} failed"))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
