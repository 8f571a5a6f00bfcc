//! Metrics Adapters
//!
//! Records per-tick telemetry through the observer port and derives
//! the run's price-accuracy measures.

pub mod history;

pub use history::{AccuracyReport, RunHistory};
