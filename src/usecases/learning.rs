//! Learning - Belief Updates from Evidence and Price
//!
//! Two channels share the same Bayesian odds update:
//! - Evidence: the source draws a signal and reveals it to a random
//!   subset of agents, who apply its exact likelihood ratio
//! - Price: every agent reads the move from the previous to the current
//!   market price as a likelihood ratio, discounted by its trust
//!
//! Both run on learning-cycle ticks, which only occur before the
//! evidence phase ends.

use rand::Rng;
use rand::seq::index;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::domain::bayesian::market_odds_ratio;
use crate::domain::error::SimError;
use crate::domain::evidence::{EvidenceSource, Signal};
use crate::domain::market::Market;
use crate::domain::order::AgentId;

/// One fired evidence event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEvent {
  pub signal: Signal,
  /// Likelihood ratio applied by the source and every recipient.
  pub factor: f64,
  /// Source belief after the update.
  pub true_belief: f64,
  pub audience: Vec<AgentId>,
}

/// When learning cycles happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningSchedule {
  /// First tick of extra trading; no cycles from here on.
  evidence_end: u64,
  /// Ticks between cycles. `None` disables learning cycles.
  interval: Option<u64>,
  /// Evidence events allowed over the run.
  max_events: u64,
}

impl LearningSchedule {
  /// `evidence_end = floor(num_iterations * (1 - extra_time_fraction))`.
  ///
  /// The interval is `learning_interval` when given, otherwise the
  /// evidence window split evenly across the events (at least 1 tick).
  /// With no events and no explicit interval there are no cycles.
  pub fn new(
    num_iterations: u64,
    extra_time_fraction: f64,
    num_evidence_events: u64,
    learning_interval: Option<u64>,
  ) -> Self {
    let evidence_end = ((1.0 - extra_time_fraction) * num_iterations as f64).floor() as u64;
    let interval = learning_interval.filter(|i| *i > 0).or_else(|| {
      (num_evidence_events > 0).then(|| (evidence_end / num_evidence_events).max(1))
    });
    Self {
      evidence_end,
      interval,
      max_events: num_evidence_events,
    }
  }

  pub fn evidence_end(&self) -> u64 {
    self.evidence_end
  }

  pub fn interval(&self) -> Option<u64> {
    self.interval
  }

  pub fn max_events(&self) -> u64 {
    self.max_events
  }

  /// Whether `tick` starts a learning cycle.
  pub fn is_cycle(&self, tick: u64) -> bool {
    tick < self.evidence_end && self.interval.is_some_and(|i| tick % i == 0)
  }
}

/// Number of agents shown each evidence draw: `floor(n * fraction)`.
pub fn audience_size(num_agents: usize, fraction: f64) -> usize {
  let size = (num_agents as f64 * fraction).floor();
  if size <= 0.0 {
    0
  } else {
    (size as usize).min(num_agents)
  }
}

/// Updates every agent from the price move since the last cycle.
///
/// Returns the raw ratio applied, or `None` while either price is missing.
#[instrument(skip(market), level = "debug")]
pub fn learn_from_market(market: &mut Market) -> Result<Option<f64>, SimError> {
  let (Some(previous), Some(current)) = (market.previous_market_price(), market.market_price())
  else {
    debug!("Price learning skipped: no price history yet");
    return Ok(None);
  };

  let previous = previous.to_f64().unwrap_or(f64::NAN);
  let current = current.to_f64().unwrap_or(f64::NAN);
  let ratio = market_odds_ratio(previous, current)?;

  for agent in market.agents_mut() {
    agent.absorb_market(ratio)?;
  }

  debug!(previous, current, ratio, "Agents learned from market price");
  Ok(Some(ratio))
}

/// Fires one evidence event: draw, update the source, reveal to a sample.
///
/// The audience is drawn uniformly without replacement each call.
pub fn distribute_evidence<R: Rng + ?Sized>(
  source: &mut EvidenceSource,
  market: &mut Market,
  audience: usize,
  rng: &mut R,
) -> Result<EvidenceEvent, SimError> {
  let signal = source.draw(rng);
  let factor = source.absorb(signal)?;

  let population = market.len();
  let amount = audience.min(population);
  if amount == 0 {
    warn!(population, "Evidence fired with an empty audience");
  }

  let chosen: Vec<AgentId> = index::sample(rng, population, amount)
    .into_iter()
    .map(AgentId)
    .collect();

  for id in &chosen {
    market.agent_mut(*id)?.absorb_evidence(factor)?;
  }

  info!(
    ?signal,
    factor,
    true_belief = source.true_belief(),
    recipients = chosen.len(),
    "Evidence revealed"
  );

  Ok(EvidenceEvent {
    signal,
    factor,
    true_belief: source.true_belief(),
    audience: chosen,
  })
}
