//! Remote cache-aside tier for computed overviews
//!
//! Keyed by `(org, timeframe)`; the store itself enforces expiry, so a hit
//! is never older than the configured TTL. An entry that fails to decode is
//! treated as a miss and overwritten by the next write-through.

use std::sync::Arc;
use tracing::debug;
use wavestack_redis::CounterStore;

use crate::aggregation::Overview;
use crate::error::Result;

pub struct OverviewCache {
    store: Arc<dyn CounterStore>,
    ttl_secs: u64,
}

impl OverviewCache {
    pub fn new(store: Arc<dyn CounterStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    fn cache_key(org_id: &str, timeframe: &str) -> String {
        format!("overview:{org_id}:{timeframe}")
    }

    pub async fn get(&self, org_id: &str, timeframe: &str) -> Result<Option<Overview>> {
        let key = Self::cache_key(org_id, timeframe);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(overview) => Ok(Some(overview)),
            Err(e) => {
                debug!(key = %key, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    pub async fn put(&self, org_id: &str, timeframe: &str, overview: &Overview) -> Result<()> {
        let key = Self::cache_key(org_id, timeframe);
        let raw = serde_json::to_string(overview)?;
        self.store.set_with_expiry(&key, &raw, self.ttl_secs).await?;
        Ok(())
    }
}
