//! Analytics REST API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::AnalyticsService;
use crate::tracking::EventTracker;

#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<AnalyticsService>,
    pub tracker: Arc<EventTracker>,
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn ready_check() -> &'static str {
    "OK"
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Serialize one overview section; an omitted category is an empty object.
fn section<T: Serialize>(value: Option<T>) -> Json<serde_json::Value> {
    Json(
        value
            .and_then(|v| serde_json::to_value(v).ok())
            .unwrap_or_else(|| serde_json::json!({})),
    )
}

fn default_timeframe() -> String {
    "7d".to_string()
}

fn default_trend_timeframe() -> String {
    "30d".to_string()
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    pub org_id: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let overview = state
        .analytics
        .overview(&query.org_id, &query.timeframe)
        .await
        .map_err(internal_error)?;
    serde_json::to_value(overview)
        .map(Json)
        .map_err(internal_error)
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub org_id: String,
    #[serde(default = "default_trend_timeframe")]
    pub timeframe: String,
}

pub async fn get_trends(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let points = state
        .analytics
        .trends(&query.org_id, &metric, &query.timeframe)
        .await
        .map_err(internal_error)?;
    Ok(Json(serde_json::json!({
        "metric": metric,
        "timeframe": query.timeframe,
        "trend": points,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TopContentQuery {
    pub org_id: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

pub async fn get_top_content(
    State(state): State<AppState>,
    Query(query): Query<TopContentQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let top = state
        .analytics
        .top_content(&query.org_id, query.limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "top_content": top })))
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub org_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EventTrack {
    pub event_type: String,
    pub event_data: serde_json::Value,
}

/// Tracking is fire-and-forget: the request reports success immediately and
/// the store writes complete in the background.
pub async fn track_event(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
    Json(event): Json<EventTrack>,
) -> Json<serde_json::Value> {
    state
        .tracker
        .track_detached(query.org_id, event.event_type, event.event_data);
    Json(serde_json::json!({
        "success": true,
        "message": "Event tracked successfully",
    }))
}

pub async fn get_platforms(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let overview = state
        .analytics
        .overview(&query.org_id, &query.timeframe)
        .await
        .map_err(internal_error)?;
    Ok(section(overview.platforms))
}

pub async fn get_engagement(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let overview = state
        .analytics
        .overview(&query.org_id, &query.timeframe)
        .await
        .map_err(internal_error)?;
    Ok(section(overview.engagement))
}

pub async fn get_growth(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let overview = state
        .analytics
        .overview(&query.org_id, &query.timeframe)
        .await
        .map_err(internal_error)?;
    Ok(section(overview.growth))
}

pub async fn get_revenue(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let overview = state
        .analytics
        .overview(&query.org_id, &query.timeframe)
        .await
        .map_err(internal_error)?;
    Ok(section(overview.revenue))
}

pub async fn get_moderation(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let overview = state
        .analytics
        .overview(&query.org_id, &query.timeframe)
        .await
        .map_err(internal_error)?;
    Ok(section(overview.moderation))
}

#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    pub org_id: String,
    pub metric_type: Option<String>,
}

pub async fn get_realtime(
    State(state): State<AppState>,
    Query(query): Query<RealtimeQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let events = state
        .analytics
        .realtime_events(&query.org_id, query.metric_type.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(serde_json::json!({
        "org_id": query.org_id,
        "metric_type": query.metric_type,
        "events": events,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
