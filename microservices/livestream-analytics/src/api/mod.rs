//! API module - REST surface and the WebSocket push channel

pub mod rest;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router(state: rest::AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::ready_check))
        // Stream analytics endpoints
        .route("/api/v1/stream/stats/{stream_id}", get(rest::get_stats))
        .route("/api/v1/stream/sentiment/{stream_id}", get(rest::get_sentiment))
        .route("/api/v1/stream/peaks/{stream_id}", get(rest::get_peaks))
        .route("/api/v1/stream/track/viewer", post(rest::track_viewer))
        .route("/api/v1/stream/track/chat", post(rest::track_chat))
        // Real-time push channel
        .route("/ws/{stream_id}", get(websocket::ws_handler))
        .with_state(state)
}
