//! The `CounterStore` seam between services and the shared store

use async_trait::async_trait;

use crate::Result;

/// One operation in a pipelined batch.
///
/// A batch is a single round trip, not a transaction: operations may apply
/// partially when the batch as a whole errors.
#[derive(Debug, Clone)]
pub enum StoreOp {
    Incr { key: String, delta: i64 },
    IncrFloat { key: String, delta: f64 },
    SetWithExpiry { key: String, value: String, ttl_secs: u64 },
    LPush { key: String, value: String },
    LTrim { key: String, start: isize, stop: isize },
    Delete { key: String },
}

/// Typed operations against the shared counter store.
///
/// The adapter owns no policy: missing keys are `None`, value parsing and
/// defaulting belong to the callers.
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Read a scalar value. `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a scalar value with an expiry in seconds.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Increment an integer counter, creating it at 0 when absent.
    async fn incr(&self, key: &str, delta: i64) -> Result<i64>;

    /// Increment a floating-point counter, creating it at 0 when absent.
    async fn incr_float(&self, key: &str, delta: f64) -> Result<f64>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Add a member to a sorted set, overwriting its score when present.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Cardinality of a sorted set (0 when absent).
    async fn zcard(&self, key: &str) -> Result<u64>;

    /// Members with scores, highest score first, over the inclusive index
    /// range `[start, stop]` (negative indices count from the end).
    async fn zrevrange_withscores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<(String, f64)>>;

    /// Push a value onto the front of a list.
    async fn lpush(&self, key: &str, value: &str) -> Result<()>;

    /// Trim a list to the inclusive index range `[start, stop]`.
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()>;

    /// List entries over the inclusive index range `[start, stop]`, front
    /// first.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// Execute a batch of operations as one round trip (not atomic).
    async fn pipeline(&self, ops: Vec<StoreOp>) -> Result<()>;
}
