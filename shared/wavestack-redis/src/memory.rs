//! In-process counter store
//!
//! DashMap-backed implementation of `CounterStore` for tests and local
//! development. Scalar expiry is honored lazily on read; sorted sets and
//! lists never expire, matching how the services use them.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::store::{CounterStore, StoreOp};
use crate::Result;

struct ScalarEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl ScalarEntry {
    fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    fn expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

/// In-memory counter store
#[derive(Default)]
pub struct MemoryStore {
    scalars: DashMap<String, ScalarEntry>,
    zsets: DashMap<String, HashMap<String, f64>>,
    lists: DashMap<String, VecDeque<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolve a Redis-style inclusive index range against a length.
/// Negative indices count from the end. `None` means the range is empty.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len_i = len as isize;
    let mut s = if start < 0 { len_i + start } else { start };
    let mut e = if stop < 0 { len_i + stop } else { stop };
    if s < 0 {
        s = 0;
    }
    if e >= len_i {
        e = len_i - 1;
    }
    if s > e || s >= len_i {
        return None;
    }
    Some((s as usize, e as usize))
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(entry) = self.scalars.get(key) {
            if entry.expired() {
                drop(entry);
                self.scalars.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.scalars.insert(
            key.to_string(),
            ScalarEntry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut entry = self
            .scalars
            .entry(key.to_string())
            .or_insert_with(|| ScalarEntry::new("0"));
        if entry.expired() {
            *entry = ScalarEntry::new("0");
        }
        let next = entry.value.parse::<i64>().unwrap_or(0) + delta;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn incr_float(&self, key: &str, delta: f64) -> Result<f64> {
        let mut entry = self
            .scalars
            .entry(key.to_string())
            .or_insert_with(|| ScalarEntry::new("0"));
        if entry.expired() {
            *entry = ScalarEntry::new("0");
        }
        let next = entry.value.parse::<f64>().unwrap_or(0.0) + delta;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.scalars.remove(key);
        self.zsets.remove(key);
        self.lists.remove(key);
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        self.zsets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        Ok(self.zsets.get(key).map_or(0, |set| set.len() as u64))
    }

    async fn zrevrange_withscores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<(String, f64)>> {
        let mut members: Vec<(String, f64)> = match self.zsets.get(key) {
            Some(set) => set.iter().map(|(m, s)| (m.clone(), *s)).collect(),
            None => return Ok(vec![]),
        };
        // Highest score first; ties in reverse lexicographic member order.
        members.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.cmp(&a.0))
        });
        Ok(match resolve_range(members.len(), start, stop) {
            Some((s, e)) => members[s..=e].to_vec(),
            None => vec![],
        })
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<()> {
        self.lists
            .entry(key.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        if let Some(mut list) = self.lists.get_mut(key) {
            match resolve_range(list.len(), start, stop) {
                Some((s, e)) => {
                    let kept: VecDeque<String> = list.iter().skip(s).take(e - s + 1).cloned().collect();
                    *list = kept;
                }
                None => list.clear(),
            }
        }
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        Ok(match self.lists.get(key) {
            Some(list) => match resolve_range(list.len(), start, stop) {
                Some((s, e)) => list.iter().skip(s).take(e - s + 1).cloned().collect(),
                None => vec![],
            },
            None => vec![],
        })
    }

    async fn pipeline(&self, ops: Vec<StoreOp>) -> Result<()> {
        for op in ops {
            match op {
                StoreOp::Incr { key, delta } => {
                    self.incr(&key, delta).await?;
                }
                StoreOp::IncrFloat { key, delta } => {
                    self.incr_float(&key, delta).await?;
                }
                StoreOp::SetWithExpiry { key, value, ttl_secs } => {
                    self.set_with_expiry(&key, &value, ttl_secs).await?;
                }
                StoreOp::LPush { key, value } => {
                    self.lpush(&key, &value).await?;
                }
                StoreOp::LTrim { key, start, stop } => {
                    self.ltrim(&key, start, stop).await?;
                }
                StoreOp::Delete { key } => {
                    self.delete(&key).await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counter_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("hits").await.unwrap(), None);
        assert_eq!(store.incr("hits", 1).await.unwrap(), 1);
        assert_eq!(store.incr("hits", 4).await.unwrap(), 5);
        assert_eq!(store.get("hits").await.unwrap(), Some("5".to_string()));
    }

    #[tokio::test]
    async fn test_scalar_expiry() {
        let store = MemoryStore::new();
        store.set_with_expiry("k", "v", 1).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_push_trim_range() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.lpush("l", &i.to_string()).await.unwrap();
        }
        // Front is the most recent push
        assert_eq!(
            store.lrange("l", 0, 1).await.unwrap(),
            vec!["4".to_string(), "3".to_string()]
        );
        store.ltrim("l", 0, 2).await.unwrap();
        assert_eq!(
            store.lrange("l", 0, -1).await.unwrap(),
            vec!["4".to_string(), "3".to_string(), "2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_zset_cardinality_and_revrange() {
        let store = MemoryStore::new();
        store.zadd("z", "a", 1.0).await.unwrap();
        store.zadd("z", "b", 3.0).await.unwrap();
        store.zadd("z", "c", 2.0).await.unwrap();
        store.zadd("z", "a", 5.0).await.unwrap(); // re-add updates score
        assert_eq!(store.zcard("z").await.unwrap(), 3);

        let top = store.zrevrange_withscores("z", 0, 1).await.unwrap();
        assert_eq!(top[0].0, "a");
        assert_eq!(top[1].0, "b");
    }

    #[tokio::test]
    async fn test_pipeline_applies_all_ops() {
        let store = MemoryStore::new();
        store
            .pipeline(vec![
                StoreOp::Incr { key: "a".into(), delta: 2 },
                StoreOp::IncrFloat { key: "b".into(), delta: 1.5 },
                StoreOp::LPush { key: "l".into(), value: "x".into() },
                StoreOp::LTrim { key: "l".into(), start: 0, stop: 0 },
                StoreOp::SetWithExpiry { key: "e".into(), value: "1".into(), ttl_secs: 60 },
            ])
            .await
            .unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some("2".to_string()));
        assert_eq!(store.get("b").await.unwrap(), Some("1.5".to_string()));
        assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["x".to_string()]);
        assert_eq!(store.get("e").await.unwrap(), Some("1".to_string()));
    }
}
