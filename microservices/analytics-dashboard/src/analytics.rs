//! Analytics service - cached overviews, trends, top content, and the
//! real-time event feed

use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use wavestack_redis::CounterStore;

use crate::aggregation::{compute_overview, parse_timeframe, Overview};
use crate::cache::OverviewCache;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopContentItem {
    pub content_id: String,
    pub score: f64,
}

pub struct AnalyticsService {
    store: Arc<dyn CounterStore>,
    cache: OverviewCache,
    category_timeout: Duration,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn CounterStore>, cache_ttl_secs: u64, category_timeout: Duration) -> Self {
        let cache = OverviewCache::new(store.clone(), cache_ttl_secs);
        Self {
            store,
            cache,
            category_timeout,
        }
    }

    /// Cached overview for an organization. Cache-aside: a hit is served
    /// directly; a miss recomputes via the orchestrator and writes through.
    pub async fn overview(&self, org_id: &str, timeframe: &str) -> Result<Overview> {
        if let Some(cached) = self.cache.get(org_id, timeframe).await? {
            return Ok(cached);
        }

        let overview =
            compute_overview(self.store.clone(), org_id, timeframe, self.category_timeout).await;
        self.cache.put(org_id, timeframe, &overview).await?;
        Ok(overview)
    }

    /// Per-day series for one metric over the window, oldest day first.
    pub async fn trends(&self, org_id: &str, metric: &str, timeframe: &str) -> Result<Vec<TrendPoint>> {
        let days = parse_timeframe(timeframe);
        let mut points = Vec::with_capacity(days as usize);

        for i in 0..days {
            let date = Utc::now() - ChronoDuration::days((days - i - 1) as i64);
            let date_key = date.format("%Y-%m-%d").to_string();
            let value = self
                .store
                .get(&format!("{metric}:{org_id}:{date_key}"))
                .await?
                .and_then(|raw| raw.parse::<f64>().ok())
                .unwrap_or(0.0);
            points.push(TrendPoint { date: date_key, value });
        }

        Ok(points)
    }

    /// Top-performing content from the ranked set, best first. This read is
    /// mandatory: a store failure propagates rather than degrading.
    pub async fn top_content(&self, org_id: &str, limit: usize) -> Result<Vec<TopContentItem>> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let ranked = self
            .store
            .zrevrange_withscores(&format!("content:{org_id}:all"), 0, limit as isize - 1)
            .await?;

        Ok(ranked
            .into_iter()
            .map(|(content_id, score)| TopContentItem { content_id, score })
            .collect())
    }

    /// Most recent raw events from the real-time feed for one metric type.
    pub async fn realtime_events(
        &self,
        org_id: &str,
        metric_type: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        let Some(metric_type) = metric_type else {
            return Ok(vec![]);
        };

        let raw = self
            .store
            .lrange(&format!("realtime:{org_id}:{metric_type}"), 0, 99)
            .await?;

        Ok(raw
            .into_iter()
            .map(|entry| {
                serde_json::from_str(&entry).unwrap_or(serde_json::Value::String(entry))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::window::day_bucket;
    use wavestack_redis::MemoryStore;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn service(store: Arc<dyn CounterStore>, ttl_secs: u64) -> AnalyticsService {
        AnalyticsService::new(store, ttl_secs, TIMEOUT)
    }

    #[tokio::test]
    async fn test_overview_within_ttl_serves_cached_result() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let views_key = format!("engagement:acme:views:{}", day_bucket(0));
        store.incr_float(&views_key, 100.0).await.unwrap();

        let analytics = service(store.clone(), 300);
        let first = analytics.overview("acme", "7d").await.unwrap();
        assert_eq!(first.engagement.as_ref().unwrap().total_views, 100.0);

        // Counter moves, but the cached overview must not.
        store.incr_float(&views_key, 50.0).await.unwrap();
        let second = analytics.overview("acme", "7d").await.unwrap();
        assert_eq!(second.engagement.as_ref().unwrap().total_views, 100.0);
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_overview_recomputed_after_ttl() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let views_key = format!("engagement:acme:views:{}", day_bucket(0));
        store.incr_float(&views_key, 100.0).await.unwrap();

        let analytics = service(store.clone(), 1);
        let first = analytics.overview("acme", "7d").await.unwrap();

        store.incr_float(&views_key, 50.0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        let second = analytics.overview("acme", "7d").await.unwrap();
        assert_eq!(second.engagement.as_ref().unwrap().total_views, 150.0);
        assert_ne!(second.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_overviews_cached_per_timeframe() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let analytics = service(store, 300);

        let week = analytics.overview("acme", "7d").await.unwrap();
        let month = analytics.overview("acme", "1m").await.unwrap();
        assert_eq!(week.timeframe, "7d");
        assert_eq!(month.timeframe, "1m");
    }

    #[tokio::test]
    async fn test_trends_oldest_first() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        store
            .incr(&format!("views:acme:{}", day_bucket(0)), 9)
            .await
            .unwrap();
        store
            .incr(&format!("views:acme:{}", day_bucket(2)), 4)
            .await
            .unwrap();

        let analytics = service(store, 300);
        let points = analytics.trends("acme", "views", "3d").await.unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, 4.0);
        assert_eq!(points[1].value, 0.0);
        assert_eq!(points[2].value, 9.0);
        assert_eq!(points[2].date, day_bucket(0));
    }

    #[tokio::test]
    async fn test_top_content_ranked_and_limited() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        store.zadd("content:acme:all", "vid-1", 10.0).await.unwrap();
        store.zadd("content:acme:all", "vid-2", 30.0).await.unwrap();
        store.zadd("content:acme:all", "vid-3", 20.0).await.unwrap();

        let analytics = service(store, 300);
        let top = analytics.top_content("acme", 2).await.unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].content_id, "vid-2");
        assert_eq!(top[1].content_id, "vid-3");
    }

    #[tokio::test]
    async fn test_realtime_events_without_metric_type() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let analytics = service(store, 300);
        assert!(analytics
            .realtime_events("acme", None)
            .await
            .unwrap()
            .is_empty());
    }
}
