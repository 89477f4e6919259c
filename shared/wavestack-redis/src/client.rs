//! Redis-backed counter store

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::store::{CounterStore, StoreOp};
use crate::{Result, StoreError};

/// Redis Store
///
/// Wraps a multiplexed connection manager; cloning is cheap and all clones
/// share one underlying connection that reconnects on failure.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis
    pub async fn connect(url: &str) -> Result<Self> {
        debug!("Connecting to Redis");

        let client = redis::Client::open(url).map_err(StoreError::Connection)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(StoreError::Connection)?;

        Ok(Self { conn })
    }

    /// Check if the connection is healthy
    pub async fn is_healthy(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(StoreError::Command)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(StoreError::Command)?;
        Ok(())
    }

    async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.conn.clone();
        conn.incr(key, delta).await.map_err(StoreError::Command)
    }

    async fn incr_float(&self, key: &str, delta: f64) -> Result<f64> {
        let mut conn = self.conn.clone();
        conn.incr(key, delta).await.map_err(StoreError::Command)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await.map_err(StoreError::Command)?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .zadd(key, member, score)
            .await
            .map_err(StoreError::Command)?;
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        conn.zcard(key).await.map_err(StoreError::Command)
    }

    async fn zrevrange_withscores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<(String, f64)>> {
        let mut conn = self.conn.clone();
        conn.zrevrange_withscores(key, start, stop)
            .await
            .map_err(StoreError::Command)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(key, value).await.map_err(StoreError::Command)?;
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .ltrim(key, start, stop)
            .await
            .map_err(StoreError::Command)?;
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.lrange(key, start, stop).await.map_err(StoreError::Command)
    }

    async fn pipeline(&self, ops: Vec<StoreOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for op in &ops {
            match op {
                StoreOp::Incr { key, delta } => {
                    pipe.incr(key, *delta).ignore();
                }
                StoreOp::IncrFloat { key, delta } => {
                    pipe.incr(key, *delta).ignore();
                }
                StoreOp::SetWithExpiry { key, value, ttl_secs } => {
                    pipe.set_ex(key, value, *ttl_secs).ignore();
                }
                StoreOp::LPush { key, value } => {
                    pipe.lpush(key, value).ignore();
                }
                StoreOp::LTrim { key, start, stop } => {
                    pipe.ltrim(key, *start, *stop).ignore();
                }
                StoreOp::Delete { key } => {
                    pipe.del(key).ignore();
                }
            }
        }

        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await.map_err(StoreError::Command)?;
        Ok(())
    }
}
