//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure. Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `metrics`: Tick history and price-accuracy measures
//! - `persistence`: JSONL tick logs and run summaries

pub mod metrics;
pub mod persistence;
