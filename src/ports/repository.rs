//! Repository Port - Run Report Persistence Interface
//!
//! Defines the trait for persisting finished runs using JSONL files.
//! Reports are written after the run and never read back into one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::AgentSnapshot;
use crate::ports::observer::TickSnapshot;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
  /// Unique run identifier.
  pub run_id: Uuid,
  /// Configured run name.
  pub name: String,
  /// Wall-clock start of the run.
  pub started_at: DateTime<Utc>,
  /// Seed used, if the run was seeded.
  pub seed: Option<u64>,
  /// Ticks executed.
  pub ticks: u64,
  /// Last trade price, `None` if nothing ever traded.
  pub final_market_price: Option<Decimal>,
  /// Evidence source belief at the end.
  pub true_belief: f64,
  pub evidence_events: u64,
  pub orders_submitted: u64,
  pub total_trades: u64,
  pub total_discarded: u64,
  /// Final state of every agent, by id.
  pub agents: Vec<AgentSnapshot>,
}

/// Trait for run report storage.
///
/// Tick snapshots are appended as JSON Lines; the summary is a single
/// document per run.
#[async_trait]
pub trait ReportRepository: Send + Sync + 'static {
  /// Append tick snapshots to the run's tick log.
  async fn append_ticks(&self, run_id: Uuid, ticks: &[TickSnapshot]) -> anyhow::Result<()>;

  /// Load the tick log of a run.
  async fn load_ticks(&self, run_id: Uuid) -> anyhow::Result<Vec<TickSnapshot>>;

  /// Save the run summary, replacing any previous one.
  async fn save_summary(&self, summary: &RunSummary) -> anyhow::Result<()>;

  /// Load a run summary.
  async fn load_summary(&self, run_id: Uuid) -> anyhow::Result<Option<RunSummary>>;

  /// Check if the repository is healthy (directory writable).
  async fn is_healthy(&self) -> bool;
}
