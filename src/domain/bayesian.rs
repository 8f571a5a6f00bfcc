//! Bayesian odds updates.
//!
//! Every belief change in the simulation has the same closed form:
//!
//! ```text
//! new = old / (old + factor * (1 - old))
//! ```
//!
//! where `factor` is the odds-likelihood ratio `P(signal | ¬E) / P(signal | E)`.
//! `factor < 1` raises the belief, `factor > 1` lowers it, `factor == 1`
//! leaves it unchanged.

use super::error::SimError;

/// Applies an odds-likelihood ratio to a probability.
///
/// # Errors
/// Fails when `old` is not a probability, when `factor` is negative or not
/// finite, or when the update is `0 / 0` (`old == 0` and `factor == 0`).
pub fn odds_update(old: f64, factor: f64) -> Result<f64, SimError> {
    if !(0.0..=1.0).contains(&old) {
        return Err(SimError::ProbabilityOutOfRange {
            value: old,
            context: "prior belief",
        });
    }
    if !factor.is_finite() || factor < 0.0 {
        return Err(SimError::DegenerateLikelihood {
            factor,
            context: "odds update",
        });
    }

    let denominator = old + factor * (1.0 - old);
    if denominator <= 0.0 {
        return Err(SimError::DegenerateLikelihood {
            factor,
            context: "zero posterior mass",
        });
    }

    let new = old / denominator;
    if !new.is_finite() {
        return Err(SimError::ProbabilityOutOfRange {
            value: new,
            context: "posterior belief",
        });
    }
    // Rounding can push a certain belief a hair past 1.
    Ok(new.clamp(0.0, 1.0))
}

/// Likelihood ratio implied by a market price moving from `previous` to `current`.
///
/// `(previous * (1 - current)) / (current * (1 - previous))`: below 1 when
/// the price rose, above 1 when it fell.
///
/// # Errors
/// Both prices must lie strictly inside (0, 1).
pub fn market_odds_ratio(previous: f64, current: f64) -> Result<f64, SimError> {
    for price in [previous, current] {
        if !(price > 0.0 && price < 1.0) {
            return Err(SimError::DegeneratePrice { price });
        }
    }
    Ok((previous * (1.0 - current)) / (current * (1.0 - previous)))
}

/// Blends a likelihood ratio toward 1 by how much the agent trusts it.
///
/// `trust = 0` ignores the signal (factor 1), `trust = 1` uses it verbatim.
pub fn trust_weighted(ratio: f64, trust: f64) -> f64 {
    trust * ratio + (1.0 - trust)
}
