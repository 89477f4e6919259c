//! Analytics Dashboard Configuration

use wavestack_core::Result;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub http_bind: String,
    pub redis_url: String,
    pub cache_ttl_secs: u64,
    pub metrics_retention_days: u32,
    pub category_timeout_secs: u64,
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_bind: std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8800".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            metrics_retention_days: std::env::var("METRICS_RETENTION_DAYS")
                .unwrap_or_else(|_| "90".to_string())
                .parse()
                .unwrap_or(90),
            category_timeout_secs: std::env::var("OVERVIEW_CATEGORY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        })
    }
}
