//! Reporting - Publish a Finished Run
//!
//! Writes the tick log before the summary, so a summary on disk always
//! has its ticks next to it.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ports::observer::TickSnapshot;
use crate::ports::repository::{ReportRepository, RunSummary};

/// Persist one run through `repo`.
///
/// # Errors
/// Propagates the first repository failure; the summary is not written
/// if the tick log fails.
pub async fn publish_report<R: ReportRepository + ?Sized>(
  repo: &R,
  summary: &RunSummary,
  ticks: &[TickSnapshot],
) -> Result<()> {
  if !repo.is_healthy().await {
    warn!(run_id = %summary.run_id, "Report repository reports unhealthy");
  }

  repo
    .append_ticks(summary.run_id, ticks)
    .await
    .context("Failed to write tick log")?;
  repo
    .save_summary(summary)
    .await
    .context("Failed to write run summary")?;

  info!(run_id = %summary.run_id, ticks = ticks.len(), "Run report published");
  Ok(())
}
