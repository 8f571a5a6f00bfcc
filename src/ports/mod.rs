//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `TickObserver`: Per-tick telemetry sink
//! - `ReportRepository`: Run report persistence (JSONL-based)

pub mod observer;
pub mod repository;
