//! Live Stream Analytics Microservice
//!
//! Real-time per-stream insights:
//! - Live viewer/chat counters with a process-local snapshot cache
//! - Continuous stats push over WebSocket
//! - Bounded-window chat sentiment
//! - Peak engagement moments for clipping

#![allow(dead_code)]

use std::sync::Arc;
use tracing::info;
use wavestack_core::{
    DependencyStatus, HealthStatus, MicroserviceRuntime, ReadinessStatus, Result, WaveStackError,
    WaveStackService,
};
use wavestack_redis::{CounterStore, RedisStore};

mod api;
mod config;
mod error;
mod sentiment;
mod stats;

pub use config::LivestreamConfig;
use sentiment::SentimentScorer;
use stats::StreamStatsEngine;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livestream_analytics=debug".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Live Stream Analytics microservice");

    let service = Arc::new(LivestreamAnalyticsService::new().await?);
    MicroserviceRuntime::run(service).await
}

pub struct LivestreamAnalyticsService {
    config: LivestreamConfig,
    store: RedisStore,
    stats: Arc<StreamStatsEngine>,
    sentiment: Arc<SentimentScorer>,
    start_time: std::time::Instant,
}

impl LivestreamAnalyticsService {
    pub async fn new() -> Result<Self> {
        let config = LivestreamConfig::from_env()?;
        let store = RedisStore::connect(&config.redis_url)
            .await
            .map_err(|e| WaveStackError::Store(e.to_string()))?;
        let shared: Arc<dyn CounterStore> = Arc::new(store.clone());

        let stats = Arc::new(StreamStatsEngine::new(shared.clone()));
        let sentiment = Arc::new(SentimentScorer::new(shared));

        Ok(Self {
            config,
            store,
            stats,
            sentiment,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl WaveStackService for LivestreamAnalyticsService {
    fn service_id(&self) -> &'static str {
        "livestream-analytics"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        let redis_available = self.store.is_healthy().await;
        ReadinessStatus {
            ready: redis_available,
            dependencies: vec![DependencyStatus {
                name: "redis".to_string(),
                available: redis_available,
                latency_ms: None,
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Live Stream Analytics service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(http = %self.config.http_bind, "Starting Live Stream Analytics server");

        let state = api::rest::AppState {
            stats: self.stats.clone(),
            sentiment: self.sentiment.clone(),
        };
        let app = api::create_router(state);

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
