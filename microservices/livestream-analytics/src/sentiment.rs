//! Chat sentiment scorer
//!
//! Lexical scoring over the most recent chat records. A record counts as
//! positive when it contains any positive-lexicon substring and negative
//! when it contains any negative-lexicon substring; a record may be both,
//! or neither. Matching is case-sensitive substring containment.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wavestack_redis::CounterStore;

use crate::error::Result;
use crate::stats::{chat_key, round1};

/// Chat records scanned per scoring pass.
pub const SENTIMENT_WINDOW: isize = 100;

const POSITIVE_LEXICON: [&str; 6] = ["awesome", "great", "love", "amazing", "lol", "pog"];
const NEGATIVE_LEXICON: [&str; 4] = ["bad", "hate", "worst", "sucks"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub sentiment_score: f64,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub total_analyzed: usize,
}

pub struct SentimentScorer {
    store: Arc<dyn CounterStore>,
}

impl SentimentScorer {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    pub async fn score(&self, stream_id: &str) -> Result<SentimentReport> {
        let records = self
            .store
            .lrange(&chat_key(stream_id), 0, SENTIMENT_WINDOW - 1)
            .await?;

        let total = records.len();
        if total == 0 {
            return Ok(SentimentReport {
                sentiment_score: 0.0,
                positive_ratio: 0.0,
                negative_ratio: 0.0,
                total_analyzed: 0,
            });
        }

        let positive = records
            .iter()
            .filter(|record| POSITIVE_LEXICON.iter().any(|word| record.contains(word)))
            .count();
        let negative = records
            .iter()
            .filter(|record| NEGATIVE_LEXICON.iter().any(|word| record.contains(word)))
            .count();

        Ok(SentimentReport {
            sentiment_score: round1((positive as f64 - negative as f64) / total as f64 * 100.0),
            positive_ratio: round1(positive as f64 / total as f64 * 100.0),
            negative_ratio: round1(negative as f64 / total as f64 * 100.0),
            total_analyzed: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ChatMessage, StreamStatsEngine};
    use wavestack_redis::MemoryStore;

    async fn seed(engine: &StreamStatsEngine, stream_id: &str, texts: &[&str]) {
        for (i, text) in texts.iter().enumerate() {
            engine
                .apply_chat_message(&ChatMessage {
                    stream_id: stream_id.to_string(),
                    user_id: format!("u{i}"),
                    username: format!("viewer{i}"),
                    message: text.to_string(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_balanced_chat_scores_zero() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let engine = StreamStatsEngine::new(store.clone());
        seed(&engine, "s1", &["this is awesome", "i hate this", "ok"]).await;

        let report = SentimentScorer::new(store).score("s1").await.unwrap();
        assert_eq!(report.total_analyzed, 3);
        assert_eq!(report.sentiment_score, 0.0);
        assert_eq!(report.positive_ratio, 33.3);
        assert_eq!(report.negative_ratio, 33.3);
    }

    #[tokio::test]
    async fn test_empty_chat_is_guarded() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let report = SentimentScorer::new(store).score("quiet").await.unwrap();
        assert_eq!(report.total_analyzed, 0);
        assert_eq!(report.sentiment_score, 0.0);
        assert_eq!(report.positive_ratio, 0.0);
        assert_eq!(report.negative_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_matching_is_case_sensitive() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let engine = StreamStatsEngine::new(store.clone());
        seed(&engine, "s1", &["AWESOME", "awesome"]).await;

        let report = SentimentScorer::new(store).score("s1").await.unwrap();
        assert_eq!(report.positive_ratio, 50.0);
    }

    #[tokio::test]
    async fn test_a_record_may_be_both_positive_and_negative() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());
        let engine = StreamStatsEngine::new(store.clone());
        seed(&engine, "s1", &["love it but the lag sucks"]).await;

        let report = SentimentScorer::new(store).score("s1").await.unwrap();
        assert_eq!(report.positive_ratio, 100.0);
        assert_eq!(report.negative_ratio, 100.0);
        assert_eq!(report.sentiment_score, 0.0);
    }
}
