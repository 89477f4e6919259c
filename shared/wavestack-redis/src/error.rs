//! Counter store error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(redis::RedisError),

    #[error("Command error: {0}")]
    Command(redis::RedisError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
