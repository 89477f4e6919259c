//! WaveStack Core - Shared service infrastructure
//!
//! This crate provides:
//! - Standard service trait all microservices must implement
//! - Error handling utilities
//! - Configuration management

pub mod config;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, WaveStackError};
pub use service::{DependencyStatus, HealthStatus, MicroserviceRuntime, ReadinessStatus, WaveStackService};
