//! Persistence Adapters - JSONL-based File Storage
//!
//! Implements the report repository port with an append-only JSONL
//! tick log and an atomic JSON summary per run.

pub mod report_store;

pub use report_store::JsonlReportStore;
