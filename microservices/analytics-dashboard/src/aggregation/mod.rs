//! Metrics aggregation - time-bucket reductions, category aggregators, and
//! the concurrent overview orchestrator

pub mod categories;
pub mod overview;
pub mod window;

pub use overview::{compute_overview, Overview};
pub use window::parse_timeframe;
