//! Category aggregators
//!
//! Six independent computations over the time-bucketed counters. Each is a
//! pure function of `(org_id, days)` apart from store reads; a store-level
//! error fails the category and lets the orchestrator omit it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wavestack_redis::CounterStore;

use super::window::{avg_metric, count_metric, current_value, round1, round2, sum_metric};
use crate::error::Result;

/// Stand-ins pending real growth computation.
pub const GROWTH_RATE_PLACEHOLDER: f64 = 0.0;
pub const NEW_FOLLOWERS_PLACEHOLDER: i64 = 0;
pub const RETENTION_RATE_PLACEHOLDER: f64 = 85.5;

pub const PLATFORMS: [&str; 6] = [
    "youtube",
    "twitch",
    "instagram",
    "tiktok",
    "facebook",
    "linkedin",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub total_videos: i64,
    pub total_clips: i64,
    pub total_posts: i64,
    pub thumbnails_generated: i64,
    pub ai_captions_used: i64,
    pub publishing_frequency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub total_views: f64,
    pub total_likes: f64,
    pub total_comments: f64,
    pub total_shares: f64,
    pub engagement_rate: f64,
    pub avg_watch_time: f64,
    pub chat_messages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub current_followers: i64,
    pub new_followers: i64,
    pub growth_rate: f64,
    pub subscribers: f64,
    pub unsubscribes: f64,
    pub retention_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub posts: i64,
    pub views: f64,
}

pub type PlatformMetrics = HashMap<String, PlatformBreakdown>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationMetrics {
    pub messages_checked: i64,
    pub messages_deleted: i64,
    pub timeouts_issued: i64,
    pub bans_issued: i64,
    pub toxicity_blocked: i64,
    pub spam_blocked: i64,
    pub safety_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueMetrics {
    pub total_revenue: f64,
    pub ad_revenue: f64,
    pub sponsor_revenue: f64,
    pub donation_revenue: f64,
    pub merch_revenue: f64,
    pub revenue_per_view: f64,
}

/// Content production metrics
pub async fn content_metrics(
    store: &dyn CounterStore,
    org_id: &str,
    days: u32,
) -> Result<ContentMetrics> {
    let total_videos = count_metric(store, &format!("content:{org_id}:videos"), days).await?;
    let total_clips = count_metric(store, &format!("content:{org_id}:clips"), days).await?;
    let total_posts = count_metric(store, &format!("content:{org_id}:posts"), days).await?;
    let thumbnails_generated =
        count_metric(store, &format!("content:{org_id}:thumbnails"), days).await?;
    let ai_captions_used =
        count_metric(store, &format!("content:{org_id}:ai_captions"), days).await?;

    let publishing_frequency = if days == 0 {
        0.0
    } else {
        round2(total_posts as f64 / days as f64)
    };

    Ok(ContentMetrics {
        total_videos,
        total_clips,
        total_posts,
        thumbnails_generated,
        ai_captions_used,
        publishing_frequency,
    })
}

/// Audience engagement metrics
pub async fn engagement_metrics(
    store: &dyn CounterStore,
    org_id: &str,
    days: u32,
) -> Result<EngagementMetrics> {
    let total_views = sum_metric(store, &format!("engagement:{org_id}:views"), days).await?;
    let total_likes = sum_metric(store, &format!("engagement:{org_id}:likes"), days).await?;
    let total_comments = sum_metric(store, &format!("engagement:{org_id}:comments"), days).await?;
    let total_shares = sum_metric(store, &format!("engagement:{org_id}:shares"), days).await?;
    let avg_watch_time = avg_metric(store, &format!("engagement:{org_id}:watch_time"), days).await?;
    let chat_messages =
        count_metric(store, &format!("engagement:{org_id}:chat_messages"), days).await?;

    let engagements = total_likes + total_comments + total_shares;
    let engagement_rate = if total_views > 0.0 {
        round2(engagements / total_views * 100.0)
    } else {
        0.0
    };

    Ok(EngagementMetrics {
        total_views,
        total_likes,
        total_comments,
        total_shares,
        engagement_rate,
        avg_watch_time,
        chat_messages,
    })
}

/// Growth and follower metrics
pub async fn growth_metrics(
    store: &dyn CounterStore,
    org_id: &str,
    days: u32,
) -> Result<GrowthMetrics> {
    let current_followers = current_value(store, &format!("growth:{org_id}:followers")).await?;
    let subscribers = sum_metric(store, &format!("growth:{org_id}:subscribers"), days).await?;
    let unsubscribes = sum_metric(store, &format!("growth:{org_id}:unsubscribes"), days).await?;

    Ok(GrowthMetrics {
        current_followers,
        new_followers: NEW_FOLLOWERS_PLACEHOLDER,
        growth_rate: GROWTH_RATE_PLACEHOLDER,
        subscribers,
        unsubscribes,
        retention_rate: RETENTION_RATE_PLACEHOLDER,
    })
}

/// Per-platform posting and viewing metrics
pub async fn platform_metrics(
    store: &dyn CounterStore,
    org_id: &str,
    days: u32,
) -> Result<PlatformMetrics> {
    let mut metrics = HashMap::with_capacity(PLATFORMS.len());
    for platform in PLATFORMS {
        let posts =
            count_metric(store, &format!("platform:{org_id}:{platform}:posts"), days).await?;
        let views =
            sum_metric(store, &format!("platform:{org_id}:{platform}:views"), days).await?;
        metrics.insert(platform.to_string(), PlatformBreakdown { posts, views });
    }
    Ok(metrics)
}

/// Moderation and safety metrics
pub async fn moderation_metrics(
    store: &dyn CounterStore,
    org_id: &str,
    days: u32,
) -> Result<ModerationMetrics> {
    let messages_checked =
        count_metric(store, &format!("moderation:{org_id}:checked"), days).await?;
    let messages_deleted =
        count_metric(store, &format!("moderation:{org_id}:deleted"), days).await?;
    let timeouts_issued =
        count_metric(store, &format!("moderation:{org_id}:timeouts"), days).await?;
    let bans_issued = count_metric(store, &format!("moderation:{org_id}:bans"), days).await?;
    let toxicity_blocked =
        count_metric(store, &format!("moderation:{org_id}:toxicity"), days).await?;
    let spam_blocked = count_metric(store, &format!("moderation:{org_id}:spam"), days).await?;

    let safety_score = if messages_checked > 0 {
        round1((messages_checked - messages_deleted) as f64 / messages_checked as f64 * 100.0)
    } else {
        100.0
    };

    Ok(ModerationMetrics {
        messages_checked,
        messages_deleted,
        timeouts_issued,
        bans_issued,
        toxicity_blocked,
        spam_blocked,
        safety_score,
    })
}

/// Revenue and monetization metrics
pub async fn revenue_metrics(
    store: &dyn CounterStore,
    org_id: &str,
    days: u32,
) -> Result<RevenueMetrics> {
    let total_revenue = sum_metric(store, &format!("revenue:{org_id}:total"), days).await?;
    let ad_revenue = sum_metric(store, &format!("revenue:{org_id}:ads"), days).await?;
    let sponsor_revenue = sum_metric(store, &format!("revenue:{org_id}:sponsors"), days).await?;
    let donation_revenue = sum_metric(store, &format!("revenue:{org_id}:donations"), days).await?;
    let merch_revenue = sum_metric(store, &format!("revenue:{org_id}:merch"), days).await?;

    let total_views = sum_metric(store, &format!("engagement:{org_id}:views"), days).await?;
    let revenue_per_view = if total_views > 0.0 {
        round2(total_revenue / total_views * 1000.0)
    } else {
        0.0
    };

    Ok(RevenueMetrics {
        total_revenue,
        ad_revenue,
        sponsor_revenue,
        donation_revenue,
        merch_revenue,
        revenue_per_view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::window::day_bucket;
    use wavestack_redis::MemoryStore;

    #[tokio::test]
    async fn test_engagement_rate_zero_without_views() {
        let store = MemoryStore::new();
        store
            .incr_float(&format!("engagement:acme:likes:{}", day_bucket(0)), 50.0)
            .await
            .unwrap();
        store
            .incr_float(&format!("engagement:acme:shares:{}", day_bucket(0)), 10.0)
            .await
            .unwrap();

        let metrics = engagement_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.total_views, 0.0);
        assert_eq!(metrics.engagement_rate, 0.0);
    }

    #[tokio::test]
    async fn test_engagement_rate_formula() {
        let store = MemoryStore::new();
        store
            .incr_float(&format!("engagement:acme:views:{}", day_bucket(0)), 200.0)
            .await
            .unwrap();
        store
            .incr_float(&format!("engagement:acme:likes:{}", day_bucket(0)), 8.0)
            .await
            .unwrap();
        store
            .incr_float(&format!("engagement:acme:comments:{}", day_bucket(1)), 2.0)
            .await
            .unwrap();

        let metrics = engagement_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.engagement_rate, 5.0);
    }

    #[tokio::test]
    async fn test_safety_score_is_100_when_nothing_checked() {
        let store = MemoryStore::new();
        let metrics = moderation_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.messages_checked, 0);
        assert_eq!(metrics.safety_score, 100.0);
    }

    #[tokio::test]
    async fn test_safety_score_formula() {
        let store = MemoryStore::new();
        store
            .incr(&format!("moderation:acme:checked:{}", day_bucket(0)), 200)
            .await
            .unwrap();
        store
            .incr(&format!("moderation:acme:deleted:{}", day_bucket(0)), 5)
            .await
            .unwrap();

        let metrics = moderation_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.safety_score, 97.5);
    }

    #[tokio::test]
    async fn test_publishing_frequency_over_two_weeks() {
        let store = MemoryStore::new();
        store
            .incr(&format!("content:acme:posts:{}", day_bucket(0)), 14)
            .await
            .unwrap();
        store
            .incr(&format!("content:acme:posts:{}", day_bucket(5)), 14)
            .await
            .unwrap();

        let days = crate::aggregation::parse_timeframe("2w");
        assert_eq!(days, 14);

        let metrics = content_metrics(&store, "acme", days).await.unwrap();
        assert_eq!(metrics.total_posts, 28);
        assert_eq!(metrics.publishing_frequency, 2.0);
    }

    #[tokio::test]
    async fn test_platform_metrics_cover_all_platforms() {
        let store = MemoryStore::new();
        store
            .incr(&format!("platform:acme:twitch:posts:{}", day_bucket(0)), 3)
            .await
            .unwrap();

        let metrics = platform_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.len(), PLATFORMS.len());
        assert_eq!(metrics["twitch"].posts, 3);
        assert_eq!(metrics["youtube"].posts, 0);
    }

    #[tokio::test]
    async fn test_growth_placeholders() {
        let store = MemoryStore::new();
        store.incr("growth:acme:followers", 1234).await.unwrap();

        let metrics = growth_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.current_followers, 1234);
        assert_eq!(metrics.new_followers, NEW_FOLLOWERS_PLACEHOLDER);
        assert_eq!(metrics.growth_rate, GROWTH_RATE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_revenue_per_view_guarded() {
        let store = MemoryStore::new();
        store
            .incr_float(&format!("revenue:acme:total:{}", day_bucket(0)), 42.0)
            .await
            .unwrap();

        let metrics = revenue_metrics(&store, "acme", 7).await.unwrap();
        assert_eq!(metrics.total_revenue, 42.0);
        assert_eq!(metrics.revenue_per_view, 0.0);
    }
}
