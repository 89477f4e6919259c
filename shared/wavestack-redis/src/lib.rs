//! WaveStack Redis Client
//!
//! Typed counter-store operations over Redis.
//! Provides scalar get/set/increment, sorted sets, bounded lists, and
//! pipelined batch execution. The `CounterStore` trait is the seam between
//! services and the store; `RedisStore` is the production implementation and
//! `MemoryStore` an in-process implementation for tests and local runs.

mod client;
mod error;
mod memory;
mod store;

pub use client::RedisStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::{CounterStore, StoreOp};
