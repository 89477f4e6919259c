//! Stream analytics REST API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::sentiment::SentimentScorer;
use crate::stats::{ChatMessage, StreamStatsEngine};

#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StreamStatsEngine>,
    pub sentiment: Arc<SentimentScorer>,
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

pub async fn get_stats(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state
        .stats
        .get_stats(&stream_id)
        .await
        .map_err(internal_error)?;
    serde_json::to_value(snapshot)
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_sentiment(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let report = state
        .sentiment
        .score(&stream_id)
        .await
        .map_err(internal_error)?;
    serde_json::to_value(report).map(Json).map_err(internal_error)
}

pub async fn get_peaks(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Json<serde_json::Value> {
    let moments = state.stats.peak_moments(&stream_id);
    Json(serde_json::json!({ "stream_id": stream_id, "peaks": moments }))
}

#[derive(Debug, Deserialize)]
pub struct ViewerEvent {
    pub stream_id: String,
    pub user_id: String,
    // join/leave; leaves are not yet distinguished by the counters.
    #[allow(dead_code)]
    pub event_type: Option<String>,
}

/// Tracking is fire-and-forget: the request reports success immediately and
/// the store writes complete in the background.
pub async fn track_viewer(
    State(state): State<AppState>,
    Json(event): Json<ViewerEvent>,
) -> Json<serde_json::Value> {
    state.stats.track_viewer(event.stream_id, event.user_id);
    Json(serde_json::json!({ "success": true }))
}

pub async fn track_chat(
    State(state): State<AppState>,
    Json(message): Json<ChatMessage>,
) -> Json<serde_json::Value> {
    state.stats.track_chat(message);
    Json(serde_json::json!({ "success": true }))
}
