//! Prediction Market Simulation — Entry Point
//!
//! Wiring sequence:
//! 1. Load the config file (first argument, default `config.toml`) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the simulation and run it on the blocking pool
//! 4. Log the final agent states and price accuracy
//! 5. Persist the tick log and summary when output is enabled

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::{Context, Result};
use tracing::info;

use prediction_market_sim::adapters::metrics::RunHistory;
use prediction_market_sim::adapters::persistence::JsonlReportStore;
use prediction_market_sim::config::loader::load_config;
use prediction_market_sim::usecases::{Simulation, publish_report};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = load_config(&path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.simulation.log_level)
                }),
        )
        .json()
        .init();

    info!(
        path = %path,
        name = %config.simulation.name,
        agents = config.agents.num_agents,
        iterations = config.simulation.num_iterations,
        evidence_events = config.evidence.num_evidence_events,
        seed = ?config.simulation.seed,
        "Configuration loaded successfully"
    );

    info!(
        name = %config.simulation.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting prediction market simulation"
    );

    // ── 3. Run the simulation off the async workers ─────────
    let mut simulation = Simulation::new(config.clone())?;
    let run = tokio::task::spawn_blocking(move || {
        let mut history = RunHistory::new();
        simulation.run(&mut history).map(|summary| (summary, history))
    });

    let (summary, history) = run.await.context("Simulation task panicked")??;

    // ── 4. Report ───────────────────────────────────────────
    for agent in &summary.agents {
        info!(
            agent = %agent.id,
            belief = agent.belief,
            n_for = agent.n_for,
            n_against = agent.n_against,
            wealth = %agent.wealth,
            "Final agent state"
        );
    }

    let accuracy = history.accuracy();
    info!(
        run_id = %summary.run_id,
        final_price = ?summary.final_market_price,
        true_belief = summary.true_belief,
        trades = summary.total_trades,
        correlation = ?accuracy.correlation,
        final_gap = ?accuracy.final_gap,
        mean_abs_gap = ?accuracy.mean_abs_gap,
        "Run complete"
    );

    // ── 5. Persist reports ──────────────────────────────────
    if config.output.enabled {
        let store = JsonlReportStore::new(&config.output.data_dir)
            .await
            .context("Failed to open report store")?;
        publish_report(&store, &summary, history.snapshots()).await?;
        info!(
            dir = %store.run_dir(summary.run_id).display(),
            "Reports written"
        );
    }

    Ok(())
}
