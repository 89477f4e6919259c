//! Event ingestion path
//!
//! One tracked event becomes a single pipelined batch: daily counter,
//! hourly counter, raw payload record with retention expiry, and the
//! real-time feed push/trim. The batch is one round trip, not a
//! transaction; a failed batch may have applied partially.

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;
use wavestack_redis::{CounterStore, StoreOp};

use crate::error::Result;

const REALTIME_FEED_CAPACITY: isize = 1000;

pub struct EventTracker {
    store: Arc<dyn CounterStore>,
    retention_days: u32,
}

impl EventTracker {
    pub fn new(store: Arc<dyn CounterStore>, retention_days: u32) -> Self {
        Self {
            store,
            retention_days,
        }
    }

    /// Apply one event's writes. Awaitable directly so callers (and tests)
    /// can observe completion; the HTTP path goes through `track_detached`.
    pub async fn track(
        &self,
        org_id: &str,
        event_type: &str,
        event_data: &serde_json::Value,
    ) -> Result<()> {
        let now = Utc::now();
        let date_key = now.format("%Y-%m-%d");
        let hour_key = now.format("%Y-%m-%d:%H");
        let payload = serde_json::to_string(event_data)?;
        let realtime_key = format!("realtime:{org_id}:{event_type}");

        self.store
            .pipeline(vec![
                StoreOp::Incr {
                    key: format!("{event_type}:{org_id}:{date_key}"),
                    delta: 1,
                },
                StoreOp::Incr {
                    key: format!("{event_type}:{org_id}:{hour_key}"),
                    delta: 1,
                },
                StoreOp::SetWithExpiry {
                    key: format!("event:{org_id}:{event_type}:{}", now.to_rfc3339()),
                    value: payload.clone(),
                    ttl_secs: self.retention_days as u64 * 86_400,
                },
                StoreOp::LPush {
                    key: realtime_key.clone(),
                    value: payload,
                },
                StoreOp::LTrim {
                    key: realtime_key,
                    start: 0,
                    stop: REALTIME_FEED_CAPACITY - 1,
                },
            ])
            .await?;

        Ok(())
    }

    /// Fire-and-forget tracking for the request path: the caller has already
    /// returned success, so failures are logged and dropped.
    pub fn track_detached(
        self: &Arc<Self>,
        org_id: String,
        event_type: String,
        event_data: serde_json::Value,
    ) {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = tracker.track(&org_id, &event_type, &event_data).await {
                warn!(
                    org_id = %org_id,
                    event_type = %event_type,
                    error = %e,
                    "Event tracking failed"
                );
            }
        });
    }
}
