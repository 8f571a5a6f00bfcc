//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use super::{BeliefInit, ConfigError, SimConfig};

/// Load and validate configuration from a TOML file.
///
/// Runs before logging is installed, so it does not log; the caller
/// reports the loaded configuration.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<SimConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<SimConfig> {
  let config: SimConfig = toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config).with_context(|| "Invalid configuration")?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Positive counts and sizes
/// - Fractions and probabilities inside their ranges
/// - Evidence likelihoods that imply valid conditionals under ¬E
pub fn validate_config(config: &SimConfig) -> Result<(), ConfigError> {
  // Population
  if config.agents.num_agents == 0 {
    return Err(ConfigError::NoAgents);
  }
  let risk = config.agents.risk_factor;
  if !(risk.is_finite() && risk > 0.0) {
    return Err(ConfigError::InvalidRiskFactor(risk));
  }
  let trust = config.agents.trust;
  if !(trust > 0.0 && trust < 1.0) {
    return Err(ConfigError::InvalidTrust(trust));
  }
  config.initial_wealth()?;
  match config.agents.belief {
    BeliefInit::Fixed { value } => fraction("belief", value)?,
    BeliefInit::Uniform { low, high } => {
      if !(0.0 <= low && low < high && high <= 1.0) {
        return Err(ConfigError::InvalidBeliefRange { low, high });
      }
    }
  }

  // Schedule
  if config.simulation.num_iterations == 0 {
    return Err(ConfigError::NoIterations);
  }
  fraction("extra_time_fraction", config.simulation.extra_time_fraction)?;
  if config.simulation.learning_interval == Some(0) {
    return Err(ConfigError::ZeroLearningInterval);
  }
  config.initial_market_price()?;

  // Quoting
  let tick = config.quoting.tick_size;
  if !(tick > 0.0 && tick < 1.0) {
    return Err(ConfigError::InvalidTickSize(tick));
  }
  config.quote_policy()?;
  let min_edge = config.quoting.min_edge;
  if !(0.0..1.0).contains(&min_edge) {
    return Err(ConfigError::InvalidMinEdge(min_edge));
  }

  // Evidence
  fraction(
    "fraction_receiving_evidence",
    config.evidence.fraction_receiving_evidence,
  )?;
  let params = config.evidence_params();
  for (name, value) in [
    ("p_a_given_e", params.p_a_given_e),
    ("p_b_given_e", params.p_b_given_e),
    ("p_a", params.p_a),
    ("p(A|not E)", params.p_a_given_not_e()),
    ("p(B|not E)", params.p_b_given_not_e()),
  ] {
    if !(value > 0.0 && value < 1.0) {
      return Err(ConfigError::InvalidLikelihood { name, value });
    }
  }

  Ok(())
}

fn fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(ConfigError::FractionOutOfRange { name, value })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("pm-sim-config-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "[agents]\nnum_agents = 7\n").unwrap();

    let config = load_config(&path.to_string_lossy()).unwrap();
    assert_eq!(config.agents.num_agents, 7);
    assert_eq!(config.simulation.num_iterations, 50);

    std::fs::write(&path, "[agents]\nnum_agents = 0\n").unwrap();
    assert!(load_config(&path.to_string_lossy()).is_err());

    let _ = std::fs::remove_file(&path);
  }

  #[test]
  fn test_empty_file_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.agents.num_agents, 50);
    assert_eq!(config.agents.trust, 0.9);
  }

  #[test]
  fn test_parse_sections() {
    let config = parse_config(
      r#"
      [simulation]
      name = "sweep-1"
      seed = 42
      num_iterations = 200
      learning_interval = 4

      [agents]
      num_agents = 10
      belief = { kind = "uniform", low = 0.05, high = 0.95 }

      [quoting]
      against_ranking = "lowest_price"

      [evidence]
      fraction_receiving_evidence = 0.25
      "#,
    )
    .unwrap();
    assert_eq!(config.simulation.seed, Some(42));
    assert_eq!(config.simulation.learning_interval, Some(4));
    assert_eq!(
      config.agents.belief,
      BeliefInit::Uniform {
        low: 0.05,
        high: 0.95
      }
    );
    assert_eq!(
      config.quoting.against_ranking,
      crate::domain::order_book::PriceRanking::LowestPrice
    );
    assert_eq!(config.evidence.fraction_receiving_evidence, 0.25);
  }

  #[test]
  fn test_rejects_trust_at_bounds() {
    let mut config = SimConfig::default();
    config.agents.trust = 1.0;
    assert_eq!(validate_config(&config), Err(ConfigError::InvalidTrust(1.0)));
    config.agents.trust = 0.0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_bad_risk_factor() {
    for risk in [0.0, -1.0] {
      let mut config = SimConfig::default();
      config.agents.risk_factor = risk;
      assert_eq!(
        validate_config(&config),
        Err(ConfigError::InvalidRiskFactor(risk))
      );
    }

    let mut config = SimConfig::default();
    config.agents.risk_factor = f64::NAN;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigError::InvalidRiskFactor(r)) if r.is_nan()
    ));
  }

  #[test]
  fn test_rejects_non_positive_wealth() {
    for wealth in [0.0, -5.0] {
      let mut config = SimConfig::default();
      config.agents.initial_wealth = wealth;
      assert_eq!(
        validate_config(&config),
        Err(ConfigError::InvalidWealth(wealth))
      );
    }
  }

  #[test]
  fn test_rejects_zero_iterations_and_bad_audience() {
    let mut config = SimConfig::default();
    config.simulation.num_iterations = 0;
    assert_eq!(validate_config(&config), Err(ConfigError::NoIterations));

    for fraction in [-0.1, 1.5] {
      let mut config = SimConfig::default();
      config.evidence.fraction_receiving_evidence = fraction;
      assert_eq!(
        validate_config(&config),
        Err(ConfigError::FractionOutOfRange {
          name: "fraction_receiving_evidence",
          value: fraction,
        })
      );
    }
  }

  #[test]
  fn test_rejects_impossible_evidence() {
    let mut config = SimConfig::default();
    config.evidence.p_a_given_e = 0.95;
    config.evidence.p_a = 0.4;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigError::InvalidLikelihood { name: "p(A|not E)", .. })
    ));
  }

  #[test]
  fn test_rejects_bad_schedule() {
    let mut config = SimConfig::default();
    config.simulation.learning_interval = Some(0);
    assert_eq!(
      validate_config(&config),
      Err(ConfigError::ZeroLearningInterval)
    );

    let mut config = SimConfig::default();
    config.simulation.extra_time_fraction = 1.5;
    assert!(matches!(
      validate_config(&config),
      Err(ConfigError::FractionOutOfRange { .. })
    ));
  }

  #[test]
  fn test_rejects_zero_agents_and_bad_tick() {
    let mut config = SimConfig::default();
    config.agents.num_agents = 0;
    assert_eq!(validate_config(&config), Err(ConfigError::NoAgents));

    let mut config = SimConfig::default();
    config.quoting.tick_size = 0.0;
    assert_eq!(
      validate_config(&config),
      Err(ConfigError::InvalidTickSize(0.0))
    );
  }
}
