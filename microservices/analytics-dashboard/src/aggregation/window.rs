//! Timeframe parsing and time-bucket reductions
//!
//! Metrics are stored as one scalar counter per calendar day under
//! `<family>:<org>:<field>:YYYY-MM-DD`. A reduction walks the trailing
//! window day by day; missing or unparseable day values count as zero, a
//! store-level error propagates.

use chrono::{Duration, Utc};
use wavestack_redis::CounterStore;

use crate::error::Result;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Parse a timeframe string ("7d", "2w", "1m") into a day count.
/// Anything malformed, too short, or zero falls back to 7 days.
pub fn parse_timeframe(timeframe: &str) -> u32 {
    let Some(unit) = timeframe.chars().last() else {
        return DEFAULT_WINDOW_DAYS;
    };
    let Ok(count) = timeframe[..timeframe.len() - unit.len_utf8()].parse::<u32>() else {
        return DEFAULT_WINDOW_DAYS;
    };
    if count == 0 {
        return DEFAULT_WINDOW_DAYS;
    }
    match unit {
        'd' => count,
        'w' => count * 7,
        'm' => count * 30,
        _ => DEFAULT_WINDOW_DAYS,
    }
}

/// Day bucket for `offset_days` before today, formatted `YYYY-MM-DD`.
pub(crate) fn day_bucket(offset_days: i64) -> String {
    (Utc::now() - Duration::days(offset_days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Sum an integer counter over the trailing window.
pub async fn count_metric(store: &dyn CounterStore, metric: &str, days: u32) -> Result<i64> {
    let mut total = 0i64;
    for i in 0..days {
        let key = format!("{}:{}", metric, day_bucket(i as i64));
        if let Some(raw) = store.get(&key).await? {
            total += raw.parse::<i64>().unwrap_or(0);
        }
    }
    Ok(total)
}

/// Sum a floating-point counter over the trailing window.
pub async fn sum_metric(store: &dyn CounterStore, metric: &str, days: u32) -> Result<f64> {
    let mut total = 0f64;
    for i in 0..days {
        let key = format!("{}:{}", metric, day_bucket(i as i64));
        if let Some(raw) = store.get(&key).await? {
            total += raw.parse::<f64>().unwrap_or(0.0);
        }
    }
    Ok(round2(total))
}

/// Average of a metric over the window, using the parallel `:count` counter.
pub async fn avg_metric(store: &dyn CounterStore, metric: &str, days: u32) -> Result<f64> {
    let total = sum_metric(store, metric, days).await?;
    let count = count_metric(store, &format!("{}:count", metric), days).await?;
    Ok(if count > 0 {
        round2(total / count as f64)
    } else {
        0.0
    })
}

/// Current value of a non-bucketed counter (0 when missing).
pub async fn current_value(store: &dyn CounterStore, key: &str) -> Result<i64> {
    Ok(store
        .get(key)
        .await?
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(0))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavestack_redis::MemoryStore;

    #[test]
    fn test_parse_timeframe_units() {
        assert_eq!(parse_timeframe("7d"), 7);
        assert_eq!(parse_timeframe("14d"), 14);
        assert_eq!(parse_timeframe("2w"), 14);
        assert_eq!(parse_timeframe("1m"), 30);
        assert_eq!(parse_timeframe("3m"), 90);
    }

    #[test]
    fn test_parse_timeframe_defaults() {
        assert_eq!(parse_timeframe(""), 7);
        assert_eq!(parse_timeframe("d"), 7);
        assert_eq!(parse_timeframe("7"), 7);
        assert_eq!(parse_timeframe("7y"), 7);
        assert_eq!(parse_timeframe("-3d"), 7);
        assert_eq!(parse_timeframe("0d"), 7);
        assert_eq!(parse_timeframe("abc"), 7);
    }

    #[tokio::test]
    async fn test_count_metric_sums_window_days() {
        let store = MemoryStore::new();
        store
            .incr(&format!("content:acme:posts:{}", day_bucket(0)), 3)
            .await
            .unwrap();
        store
            .incr(&format!("content:acme:posts:{}", day_bucket(1)), 2)
            .await
            .unwrap();
        // Outside a 2-day window
        store
            .incr(&format!("content:acme:posts:{}", day_bucket(2)), 10)
            .await
            .unwrap();

        assert_eq!(count_metric(&store, "content:acme:posts", 2).await.unwrap(), 5);
        assert_eq!(count_metric(&store, "content:acme:posts", 3).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_missing_and_garbage_days_count_as_zero() {
        let store = MemoryStore::new();
        store
            .set_with_expiry(&format!("revenue:acme:total:{}", day_bucket(0)), "garbage", 600)
            .await
            .unwrap();

        assert_eq!(sum_metric(&store, "revenue:acme:total", 7).await.unwrap(), 0.0);
        assert_eq!(count_metric(&store, "revenue:acme:total", 7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_avg_metric_guards_zero_count() {
        let store = MemoryStore::new();
        assert_eq!(avg_metric(&store, "engagement:acme:watch_time", 7).await.unwrap(), 0.0);

        store
            .incr_float(&format!("engagement:acme:watch_time:{}", day_bucket(0)), 30.0)
            .await
            .unwrap();
        store
            .incr(&format!("engagement:acme:watch_time:count:{}", day_bucket(0)), 4)
            .await
            .unwrap();
        assert_eq!(avg_metric(&store, "engagement:acme:watch_time", 7).await.unwrap(), 7.5);
    }
}
