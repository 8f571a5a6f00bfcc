//! Report Store - JSONL Tick Logs and Atomic Run Summaries
//!
//! Each run gets its own directory `<data_dir>/<run_id>/` holding:
//! - `ticks.jsonl`: one tick snapshot per line, append-only
//! - `summary.json`: the run summary, written via tmp file + rename

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::ports::observer::TickSnapshot;
use crate::ports::repository::{ReportRepository, RunSummary};

const TICKS_FILE: &str = "ticks.jsonl";
const SUMMARY_FILE: &str = "summary.json";

/// File-backed [`ReportRepository`].
pub struct JsonlReportStore {
    /// Parent of all run directories.
    base_dir: PathBuf,
}

impl JsonlReportStore {
    /// Create a store rooted at `data_dir`, creating it if needed.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let base_dir = PathBuf::from(data_dir);
        fs::create_dir_all(&base_dir)
            .await
            .context("Failed to create data directory")?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory of one run.
    pub fn run_dir(&self, run_id: Uuid) -> PathBuf {
        self.base_dir.join(run_id.to_string())
    }

    async fn ensure_run_dir(&self, run_id: Uuid) -> Result<PathBuf> {
        let dir = self.run_dir(run_id);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create run directory {}", dir.display()))?;
        Ok(dir)
    }
}

#[async_trait]
impl ReportRepository for JsonlReportStore {
    #[instrument(skip(self, ticks), fields(count = ticks.len()))]
    async fn append_ticks(&self, run_id: Uuid, ticks: &[TickSnapshot]) -> Result<()> {
        let path = self.ensure_run_dir(run_id).await?.join(TICKS_FILE);

        let mut buf = String::new();
        for tick in ticks {
            buf.push_str(&serde_json::to_string(tick).context("Failed to serialize tick")?);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open tick log file")?;
        file.write_all(buf.as_bytes())
            .await
            .context("Failed to write tick log")?;
        file.flush().await.context("Failed to flush tick log")?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_ticks(&self, run_id: Uuid) -> Result<Vec<TickSnapshot>> {
        let path = self.run_dir(run_id).join(TICKS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .context("Failed to read tick log")?;
        let mut ticks = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<TickSnapshot>(line) {
                Ok(tick) => ticks.push(tick),
                Err(e) => warn!(
                    file = %path.display(),
                    error = %e,
                    "Skipping malformed tick record"
                ),
            }
        }
        Ok(ticks)
    }

    #[instrument(skip(self, summary), fields(run_id = %summary.run_id))]
    async fn save_summary(&self, summary: &RunSummary) -> Result<()> {
        let dir = self.ensure_run_dir(summary.run_id).await?;
        let path = dir.join(SUMMARY_FILE);
        let tmp = dir.join(format!("{SUMMARY_FILE}.tmp"));

        let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
        fs::write(&tmp, &json)
            .await
            .context("Failed to write tmp summary file")?;
        fs::rename(&tmp, &path)
            .await
            .context("Failed to rename summary file")?;

        info!(path = %path.display(), "Run summary saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_summary(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let path = self.run_dir(run_id).join(SUMMARY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .await
            .context("Failed to read summary file")?;
        let summary = serde_json::from_str(&json).context("Failed to parse summary JSON")?;
        Ok(Some(summary))
    }

    async fn is_healthy(&self) -> bool {
        match fs::metadata(&self.base_dir).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(e) => {
                warn!(error = %e, "Report directory unavailable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::phase::Phase;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn temp_dir() -> String {
        std::env::temp_dir()
            .join(format!("pm-sim-store-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned()
    }

    fn tick(n: u64) -> TickSnapshot {
        TickSnapshot {
            tick: n,
            phase: Phase::EvidencePhase,
            market_price: Some(dec!(0.55)),
            true_belief: 0.6,
            average_belief: 0.52,
            trades: 2,
            discarded: 0,
            depth_for: 3,
            depth_against: 1,
            evidence: None,
        }
    }

    #[tokio::test]
    async fn test_ticks_append_across_calls() {
        let dir = temp_dir();
        let store = JsonlReportStore::new(&dir).await.unwrap();
        let run = Uuid::new_v4();

        store.append_ticks(run, &[tick(0), tick(1)]).await.unwrap();
        store.append_ticks(run, &[tick(2)]).await.unwrap();

        let loaded = store.load_ticks(run).await.unwrap();
        assert_eq!(loaded.iter().map(|t| t.tick).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(store.is_healthy().await);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_summary_overwrites_atomically() {
        let dir = temp_dir();
        let store = JsonlReportStore::new(&dir).await.unwrap();
        let run = Uuid::new_v4();
        assert!(store.load_summary(run).await.unwrap().is_none());

        let mut summary = RunSummary {
            run_id: run,
            name: "t".into(),
            started_at: Utc::now(),
            seed: Some(1),
            ticks: 10,
            final_market_price: None,
            true_belief: 0.5,
            evidence_events: 0,
            orders_submitted: 0,
            total_trades: 0,
            total_discarded: 0,
            agents: Vec::new(),
        };
        store.save_summary(&summary).await.unwrap();
        summary.ticks = 20;
        store.save_summary(&summary).await.unwrap();

        let loaded = store.load_summary(run).await.unwrap().unwrap();
        assert_eq!(loaded.ticks, 20);
        assert!(!store.run_dir(run).join("summary.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
