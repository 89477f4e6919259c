//! Live Stream Analytics Configuration

use wavestack_core::Result;

#[derive(Debug, Clone)]
pub struct LivestreamConfig {
    pub http_bind: String,
    pub redis_url: String,
}

impl LivestreamConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_bind: std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:9500".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        })
    }
}
