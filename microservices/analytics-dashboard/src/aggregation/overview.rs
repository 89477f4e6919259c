//! Overview orchestrator
//!
//! Fans out the six category aggregators as independent tasks, joins all of
//! them, and assembles the composite result. A category that fails or times
//! out is omitted from the overview; the rest are served as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;
use wavestack_redis::CounterStore;

use super::categories::{
    content_metrics, engagement_metrics, growth_metrics, moderation_metrics, platform_metrics,
    revenue_metrics, ContentMetrics, EngagementMetrics, GrowthMetrics, ModerationMetrics,
    PlatformMetrics, RevenueMetrics,
};
use super::window::parse_timeframe;
use crate::error::Result;

/// Composite overview across all metric categories.
///
/// Absent categories are the ones whose aggregator failed for this
/// computation; they are omitted from the serialized payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub timeframe: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<EngagementMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<GrowthMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<PlatformMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueMetrics>,
}

/// Compute a fresh overview for an organization.
///
/// Each category runs as its own task under `category_timeout`; the fan-in
/// waits on all six before assembly. `updated_at` is captured at assembly
/// time, not at fan-out start.
pub async fn compute_overview(
    store: Arc<dyn CounterStore>,
    org_id: &str,
    timeframe: &str,
    category_timeout: Duration,
) -> Overview {
    let days = parse_timeframe(timeframe);

    let content_task = tokio::spawn({
        let store = store.clone();
        let org = org_id.to_string();
        async move { content_metrics(store.as_ref(), &org, days).await }
    });
    let engagement_task = tokio::spawn({
        let store = store.clone();
        let org = org_id.to_string();
        async move { engagement_metrics(store.as_ref(), &org, days).await }
    });
    let growth_task = tokio::spawn({
        let store = store.clone();
        let org = org_id.to_string();
        async move { growth_metrics(store.as_ref(), &org, days).await }
    });
    let platforms_task = tokio::spawn({
        let store = store.clone();
        let org = org_id.to_string();
        async move { platform_metrics(store.as_ref(), &org, days).await }
    });
    let moderation_task = tokio::spawn({
        let store = store.clone();
        let org = org_id.to_string();
        async move { moderation_metrics(store.as_ref(), &org, days).await }
    });
    let revenue_task = tokio::spawn({
        let store = store.clone();
        let org = org_id.to_string();
        async move { revenue_metrics(store.as_ref(), &org, days).await }
    });

    let (content, engagement, growth, platforms, moderation, revenue) = tokio::join!(
        join_category("content", category_timeout, content_task),
        join_category("engagement", category_timeout, engagement_task),
        join_category("growth", category_timeout, growth_task),
        join_category("platforms", category_timeout, platforms_task),
        join_category("moderation", category_timeout, moderation_task),
        join_category("revenue", category_timeout, revenue_task),
    );

    Overview {
        timeframe: timeframe.to_string(),
        updated_at: Utc::now(),
        content,
        engagement,
        growth,
        platforms,
        moderation,
        revenue,
    }
}

async fn join_category<T>(
    name: &'static str,
    timeout: Duration,
    mut handle: JoinHandle<Result<T>>,
) -> Option<T> {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(Ok(value))) => Some(value),
        Ok(Ok(Err(e))) => {
            warn!(category = name, error = %e, "Category aggregation failed");
            None
        }
        Ok(Err(e)) => {
            warn!(category = name, error = %e, "Category task aborted");
            None
        }
        Err(_) => {
            handle.abort();
            warn!(
                category = name,
                timeout_secs = timeout.as_secs(),
                "Category aggregation timed out"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wavestack_redis::{MemoryStore, StoreError, StoreOp};

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Delegates to a `MemoryStore` but fails any read whose key starts
    /// with the configured prefix.
    struct FailingStore {
        inner: MemoryStore,
        fail_prefix: &'static str,
    }

    impl FailingStore {
        fn injected_error() -> StoreError {
            StoreError::Connection(std::io::Error::new(std::io::ErrorKind::Other, "injected").into())
        }

        fn check(&self, key: &str) -> wavestack_redis::Result<()> {
            if key.starts_with(self.fail_prefix) {
                Err(Self::injected_error())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl wavestack_redis::CounterStore for FailingStore {
        async fn get(&self, key: &str) -> wavestack_redis::Result<Option<String>> {
            self.check(key)?;
            self.inner.get(key).await
        }
        async fn set_with_expiry(
            &self,
            key: &str,
            value: &str,
            ttl_secs: u64,
        ) -> wavestack_redis::Result<()> {
            self.inner.set_with_expiry(key, value, ttl_secs).await
        }
        async fn incr(&self, key: &str, delta: i64) -> wavestack_redis::Result<i64> {
            self.inner.incr(key, delta).await
        }
        async fn incr_float(&self, key: &str, delta: f64) -> wavestack_redis::Result<f64> {
            self.inner.incr_float(key, delta).await
        }
        async fn delete(&self, key: &str) -> wavestack_redis::Result<()> {
            self.inner.delete(key).await
        }
        async fn zadd(&self, key: &str, member: &str, score: f64) -> wavestack_redis::Result<()> {
            self.inner.zadd(key, member, score).await
        }
        async fn zcard(&self, key: &str) -> wavestack_redis::Result<u64> {
            self.inner.zcard(key).await
        }
        async fn zrevrange_withscores(
            &self,
            key: &str,
            start: isize,
            stop: isize,
        ) -> wavestack_redis::Result<Vec<(String, f64)>> {
            self.check(key)?;
            self.inner.zrevrange_withscores(key, start, stop).await
        }
        async fn lpush(&self, key: &str, value: &str) -> wavestack_redis::Result<()> {
            self.inner.lpush(key, value).await
        }
        async fn ltrim(&self, key: &str, start: isize, stop: isize) -> wavestack_redis::Result<()> {
            self.inner.ltrim(key, start, stop).await
        }
        async fn lrange(
            &self,
            key: &str,
            start: isize,
            stop: isize,
        ) -> wavestack_redis::Result<Vec<String>> {
            self.check(key)?;
            self.inner.lrange(key, start, stop).await
        }
        async fn pipeline(&self, ops: Vec<StoreOp>) -> wavestack_redis::Result<()> {
            self.inner.pipeline(ops).await
        }
    }

    #[tokio::test]
    async fn test_healthy_backend_yields_all_categories() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let overview = compute_overview(store, "acme", "7d", TIMEOUT).await;

        assert_eq!(overview.timeframe, "7d");
        assert!(overview.content.is_some());
        assert!(overview.engagement.is_some());
        assert!(overview.growth.is_some());
        assert!(overview.platforms.is_some());
        assert!(overview.moderation.is_some());
        assert!(overview.revenue.is_some());
    }

    #[tokio::test]
    async fn test_failed_category_is_omitted() {
        let store: Arc<dyn CounterStore> = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_prefix: "moderation:",
        });
        let overview = compute_overview(store, "acme", "7d", TIMEOUT).await;

        assert!(overview.moderation.is_none());
        assert!(overview.content.is_some());
        assert!(overview.engagement.is_some());
        assert!(overview.growth.is_some());
        assert!(overview.platforms.is_some());
        assert!(overview.revenue.is_some());
    }

    #[tokio::test]
    async fn test_omitted_category_absent_from_payload() {
        let store: Arc<dyn CounterStore> = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_prefix: "revenue:",
        });
        let overview = compute_overview(store, "acme", "7d", TIMEOUT).await;

        let payload = serde_json::to_value(&overview).unwrap();
        assert!(payload.get("revenue").is_none());
        assert!(payload.get("engagement").is_some());
    }
}
