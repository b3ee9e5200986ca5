use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analytics::{self, DayAnalytics};
use crate::error::AppResult;
use crate::llm;
use crate::logic;
use crate::models::{DailySummary, StoreStats, Suggestions, TrendSummary};
use crate::slots;
use crate::store::now_fixed_offset;
use crate::AppState;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_fixed_offset().to_rfc3339(),
        "service": "focus_ring",
    }))
}

// -----------------------------
// GET /api/summary/:date
// -----------------------------
pub async fn get_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<DailySummary>> {
    let date = slots::parse_date(&date)?;
    let summary = logic::compute_daily_summary(state.store.as_ref(), date)?;
    Ok(Json(summary))
}

// -----------------------------
// GET /api/analytics/:date
// -----------------------------
pub async fn get_analytics(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<DayAnalytics>> {
    let date = slots::parse_date(&date)?;
    let analytics = analytics::compute_day_analytics(state.store.as_ref(), date)?;
    Ok(Json(analytics))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub from: String, // "YYYY-MM-DD"
    pub to: String,
}

// -----------------------------
// GET /api/trend?from=&to=
// At most MAX_TREND_DAYS days, inclusive
// -----------------------------
pub async fn get_trend(
    State(state): State<AppState>,
    Query(q): Query<TrendQuery>,
) -> AppResult<Json<TrendSummary>> {
    let start = slots::parse_date(&q.from)?;
    let end = slots::parse_date(&q.to)?;
    let trend = logic::compute_trend(state.store.as_ref(), start, end)?;
    Ok(Json(trend))
}

// -----------------------------
// GET /api/ai/suggestions/:date
// LLM when configured, rule-based otherwise or on any LLM failure
// -----------------------------
pub async fn get_suggestions(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<Suggestions>> {
    let date = slots::parse_date(&date)?;
    let store = state.store.as_ref();
    let summary = logic::compute_daily_summary(store, date)?;

    let context = match &state.llm {
        Some(_) => {
            let analytics = analytics::compute_day_analytics(store, date)?;
            llm::build_context(&summary, &analytics, &store.categories()?)
        }
        None => String::new(),
    };

    let suggestions = llm::suggest_with_fallback(state.llm.as_ref(), &summary, &context).await;
    Ok(Json(suggestions))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub database: StoreStats,
    pub environment: EnvironmentInfo,
    pub api_version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentInfo {
    pub has_llm_api_key: bool,
    pub current_date: String,
}

// -----------------------------
// GET /api/stats
// -----------------------------
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    let database = state.store.stats()?;
    Ok(Json(StatsResponse {
        database,
        environment: EnvironmentInfo {
            has_llm_api_key: state.llm.is_some(),
            current_date: now_fixed_offset().date_naive().to_string(),
        },
        api_version: API_VERSION,
    }))
}
