//! Use Cases Layer - Application Logic
//!
//! Drives the domain through a run and reports it via the ports.
//!
//! Use cases:
//! - `MatchingEngine`: Clears crossing FOR/AGAINST orders
//! - `learning`: Learning schedule, price learning, evidence rounds
//! - `Simulation`: Tick loop and run lifecycle
//! - `publish_report`: Persist a finished run

pub mod learning;
pub mod matching_engine;
pub mod reporting;
pub mod simulation;

pub use matching_engine::{ClearingReport, Fill, MatchingEngine};
pub use reporting::publish_report;
pub use simulation::Simulation;
