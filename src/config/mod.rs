//! Configuration Module - TOML-based Simulation Configuration
//!
//! Loads and validates the run parameters from `config.toml`.
//! Every section and field has a serde default, so an empty file
//! reproduces the reference run: 50 agents, 50 ticks, 20 evidence
//! events shown to a tenth of the population.

pub mod loader;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::agent::{PRICE_DP, QuotePolicy};
use crate::domain::evidence::EvidenceParams;
use crate::domain::order_book::PriceRanking;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimConfig {
  /// Run identity, length and schedule.
  #[serde(default)]
  pub simulation: SimulationConfig,
  /// Population parameters.
  #[serde(default)]
  pub agents: AgentsConfig,
  /// Quote pricing and sizing.
  #[serde(default)]
  pub quoting: QuotingConfig,
  /// Evidence source parameters.
  #[serde(default)]
  pub evidence: EvidenceConfig,
  /// Report persistence.
  #[serde(default)]
  pub output: OutputConfig,
}

/// Run identity and schedule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
  /// Human-readable run name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// RNG seed. Entropy-seeded when absent.
  #[serde(default)]
  pub seed: Option<u64>,
  /// Number of ticks.
  #[serde(default = "default_num_iterations")]
  pub num_iterations: u64,
  /// Share of the run after evidence stops.
  #[serde(default = "default_extra_time_fraction")]
  pub extra_time_fraction: f64,
  /// Ticks between learning cycles. Derived from the evidence count when absent.
  #[serde(default)]
  pub learning_interval: Option<u64>,
  /// Market price to open with, skipping the warmup seeding.
  #[serde(default)]
  pub initial_market_price: Option<f64>,
}

/// How agents pick their starting belief.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeliefInit {
  /// Every agent starts at `value`.
  Fixed { value: f64 },
  /// Each agent draws from `[low, high)`.
  Uniform { low: f64, high: f64 },
}

impl Default for BeliefInit {
  fn default() -> Self {
    Self::Fixed { value: 0.5 }
  }
}

/// Population configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentsConfig {
  #[serde(default = "default_num_agents")]
  pub num_agents: usize,
  /// Position size multiplier.
  #[serde(default = "default_risk_factor")]
  pub risk_factor: f64,
  /// Weight on price-implied evidence, in (0, 1).
  #[serde(default = "default_trust")]
  pub trust: f64,
  /// Starting cash per agent.
  #[serde(default = "default_initial_wealth")]
  pub initial_wealth: f64,
  #[serde(default)]
  pub belief: BeliefInit,
}

/// Quote configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotingConfig {
  /// Price improvement per quote.
  #[serde(default = "default_tick_size")]
  pub tick_size: f64,
  /// Minimum edge before an agent quotes.
  #[serde(default)]
  pub min_edge: f64,
  /// Ordering of the AGAINST book.
  #[serde(default)]
  pub against_ranking: PriceRanking,
}

/// Evidence source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvidenceConfig {
  #[serde(default = "default_num_evidence_events")]
  pub num_evidence_events: u64,
  /// Share of agents shown each signal.
  #[serde(default = "default_fraction_receiving_evidence")]
  pub fraction_receiving_evidence: f64,
  #[serde(default = "default_p_a_given_e")]
  pub p_a_given_e: f64,
  #[serde(default = "default_p_b_given_e")]
  pub p_b_given_e: f64,
  #[serde(default = "default_p_a")]
  pub p_a: f64,
}

/// Report persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
  /// Write tick and summary reports after the run.
  #[serde(default)]
  pub enabled: bool,
  /// Directory for run reports.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

/// A configuration value outside its allowed range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("num_agents must be positive")]
  NoAgents,

  #[error("num_iterations must be positive")]
  NoIterations,

  #[error("{name} must be in [0, 1], got {value}")]
  FractionOutOfRange { name: &'static str, value: f64 },

  #[error("risk_factor must be positive, got {0}")]
  InvalidRiskFactor(f64),

  #[error("trust must be in (0, 1), got {0}")]
  InvalidTrust(f64),

  #[error("initial_wealth must be positive, got {0}")]
  InvalidWealth(f64),

  #[error("tick_size must be in (0, 1), got {0}")]
  InvalidTickSize(f64),

  #[error("min_edge must be in [0, 1), got {0}")]
  InvalidMinEdge(f64),

  #[error("learning_interval must be positive")]
  ZeroLearningInterval,

  #[error("initial_market_price must be in (0, 1), got {0}")]
  InvalidInitialPrice(f64),

  #[error("belief bounds must satisfy 0 <= low < high <= 1, got [{low}, {high})")]
  InvalidBeliefRange { low: f64, high: f64 },

  #[error("{name} must be in (0, 1), got {value}")]
  InvalidLikelihood { name: &'static str, value: f64 },
}

impl SimConfig {
  pub fn evidence_params(&self) -> EvidenceParams {
    EvidenceParams {
      p_a_given_e: self.evidence.p_a_given_e,
      p_b_given_e: self.evidence.p_b_given_e,
      p_a: self.evidence.p_a,
    }
  }

  pub fn quote_policy(&self) -> Result<QuotePolicy, ConfigError> {
    let tick_size = to_decimal(self.quoting.tick_size)
      .filter(|t| *t > Decimal::ZERO)
      .ok_or(ConfigError::InvalidTickSize(self.quoting.tick_size))?;
    Ok(QuotePolicy {
      tick_size,
      min_edge: self.quoting.min_edge,
    })
  }

  pub fn initial_wealth(&self) -> Result<Decimal, ConfigError> {
    to_decimal(self.agents.initial_wealth)
      .filter(|w| *w > Decimal::ZERO)
      .ok_or(ConfigError::InvalidWealth(self.agents.initial_wealth))
  }

  pub fn initial_market_price(&self) -> Result<Option<Decimal>, ConfigError> {
    self
      .simulation
      .initial_market_price
      .map(|p| {
        to_decimal(p)
          .filter(|d| *d > Decimal::ZERO && *d < Decimal::ONE)
          .ok_or(ConfigError::InvalidInitialPrice(p))
      })
      .transpose()
  }
}

fn to_decimal(value: f64) -> Option<Decimal> {
  Decimal::from_f64(value).map(|d| d.round_dp(PRICE_DP))
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      seed: None,
      num_iterations: default_num_iterations(),
      extra_time_fraction: default_extra_time_fraction(),
      learning_interval: None,
      initial_market_price: None,
    }
  }
}

impl Default for AgentsConfig {
  fn default() -> Self {
    Self {
      num_agents: default_num_agents(),
      risk_factor: default_risk_factor(),
      trust: default_trust(),
      initial_wealth: default_initial_wealth(),
      belief: BeliefInit::default(),
    }
  }
}

impl Default for QuotingConfig {
  fn default() -> Self {
    Self {
      tick_size: default_tick_size(),
      min_edge: 0.0,
      against_ranking: PriceRanking::default(),
    }
  }
}

impl Default for EvidenceConfig {
  fn default() -> Self {
    Self {
      num_evidence_events: default_num_evidence_events(),
      fraction_receiving_evidence: default_fraction_receiving_evidence(),
      p_a_given_e: default_p_a_given_e(),
      p_b_given_e: default_p_b_given_e(),
      p_a: default_p_a(),
    }
  }
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      data_dir: default_data_dir(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "prediction-market".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_num_iterations() -> u64 {
  50
}

fn default_extra_time_fraction() -> f64 {
  0.33
}

fn default_num_agents() -> usize {
  50
}

fn default_risk_factor() -> f64 {
  0.5
}

fn default_trust() -> f64 {
  0.9
}

fn default_initial_wealth() -> f64 {
  100.0
}

fn default_tick_size() -> f64 {
  0.01
}

fn default_num_evidence_events() -> u64 {
  20
}

fn default_fraction_receiving_evidence() -> f64 {
  0.1
}

fn default_p_a_given_e() -> f64 {
  0.6
}

fn default_p_b_given_e() -> f64 {
  0.4
}

fn default_p_a() -> f64 {
  0.5
}

fn default_data_dir() -> String {
  "data".to_string()
}
