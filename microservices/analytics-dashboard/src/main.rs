//! Analytics Dashboard Microservice
//!
//! Cross-platform metrics aggregation:
//! - Six-category overview computed by concurrent fan-out over the counter store
//! - Cache-aside overview tier with TTL expiry
//! - Event ingestion with pipelined counter/payload writes
//! - Trend, top-content, and real-time event read surfaces

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wavestack_core::{
    DependencyStatus, HealthStatus, MicroserviceRuntime, ReadinessStatus, Result, WaveStackError,
    WaveStackService,
};
use wavestack_redis::{CounterStore, RedisStore};

mod aggregation;
mod analytics;
mod api;
mod cache;
mod config;
mod error;
mod tracking;

pub use config::AnalyticsConfig;
use analytics::AnalyticsService;
use tracking::EventTracker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("analytics_dashboard=debug".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting Analytics Dashboard microservice");

    let service = Arc::new(AnalyticsDashboardService::new().await?);
    MicroserviceRuntime::run(service).await
}

pub struct AnalyticsDashboardService {
    config: AnalyticsConfig,
    store: RedisStore,
    analytics: Arc<AnalyticsService>,
    tracker: Arc<EventTracker>,
    start_time: std::time::Instant,
}

impl AnalyticsDashboardService {
    pub async fn new() -> Result<Self> {
        let config = AnalyticsConfig::from_env()?;
        let store = RedisStore::connect(&config.redis_url)
            .await
            .map_err(|e| WaveStackError::Store(e.to_string()))?;
        let shared: Arc<dyn CounterStore> = Arc::new(store.clone());

        let analytics = Arc::new(AnalyticsService::new(
            shared.clone(),
            config.cache_ttl_secs,
            Duration::from_secs(config.category_timeout_secs),
        ));
        let tracker = Arc::new(EventTracker::new(shared, config.metrics_retention_days));

        Ok(Self {
            config,
            store,
            analytics,
            tracker,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl WaveStackService for AnalyticsDashboardService {
    fn service_id(&self) -> &'static str {
        "analytics-dashboard"
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
        info!("Shutting down Analytics Dashboard service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.http_bind,
            cache_ttl_secs = self.config.cache_ttl_secs,
            retention_days = self.config.metrics_retention_days,
            "Starting Analytics Dashboard server"
        );

        let state = api::rest::AppState {
            analytics: self.analytics.clone(),
            tracker: self.tracker.clone(),
        };
        let app = api::create_router(state);

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
