//! API module - REST surface

pub mod rest;

use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router(state: rest::AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::ready_check))
        // Analytics endpoints
        .route("/api/v1/analytics/overview", get(rest::get_overview))
        .route("/api/v1/analytics/trends/{metric}", get(rest::get_trends))
        .route("/api/v1/analytics/content/top", get(rest::get_top_content))
        .route("/api/v1/analytics/track", post(rest::track_event))
        .route("/api/v1/analytics/platforms", get(rest::get_platforms))
        .route("/api/v1/analytics/engagement", get(rest::get_engagement))
        .route("/api/v1/analytics/growth", get(rest::get_growth))
        .route("/api/v1/analytics/revenue", get(rest::get_revenue))
        .route("/api/v1/analytics/moderation", get(rest::get_moderation))
        .route("/api/v1/analytics/realtime", get(rest::get_realtime))
        .with_state(state)
}
