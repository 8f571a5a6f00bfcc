//! Exogenous evidence generator.
//!
//! A latent two-signal Bayesian source. Each draw emits signal A with
//! probability `p(A)`, otherwise B, and moves the source's own "true"
//! belief by that signal's exact likelihood ratio. The same ratio is what
//! informed agents apply to their beliefs.
//!
//! With a uniform prior on the event, the unconditional signal rates pin
//! the rates under ¬E: `p(A|¬E) = 2·p(A) − p(A|E)`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bayesian::odds_update;
use super::error::SimError;

/// The two signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    A,
    B,
}

/// Signal likelihoods of the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvidenceParams {
    /// P(A | event)
    pub p_a_given_e: f64,
    /// P(B | event)
    pub p_b_given_e: f64,
    /// Marginal P(A); P(B) is its complement.
    pub p_a: f64,
}

impl EvidenceParams {
    pub fn p_b(&self) -> f64 {
        1.0 - self.p_a
    }

    pub fn p_a_given_not_e(&self) -> f64 {
        2.0 * self.p_a - self.p_a_given_e
    }

    pub fn p_b_given_not_e(&self) -> f64 {
        2.0 * self.p_b() - self.p_b_given_e
    }
}

impl Default for EvidenceParams {
    fn default() -> Self {
        Self {
            p_a_given_e: 0.6,
            p_b_given_e: 0.4,
            p_a: 0.5,
        }
    }
}

/// The latent source and its current belief in the event.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSource {
    params: EvidenceParams,
    true_belief: f64,
    events_fired: u64,
}

impl EvidenceSource {
    /// Starts from an uninformed belief of 0.5.
    ///
    /// # Errors
    /// Every conditional likelihood must lie strictly inside (0, 1).
    pub fn new(params: EvidenceParams) -> Result<Self, SimError> {
        let checks = [
            (params.p_a_given_e, "p(A|E)"),
            (params.p_b_given_e, "p(B|E)"),
            (params.p_a_given_not_e(), "p(A|not E)"),
            (params.p_b_given_not_e(), "p(B|not E)"),
        ];
        for (value, context) in checks {
            if !(value > 0.0 && value < 1.0) {
                return Err(SimError::ProbabilityOutOfRange { value, context });
            }
        }
        Ok(Self {
            params,
            true_belief: 0.5,
            events_fired: 0,
        })
    }

    pub fn params(&self) -> &EvidenceParams {
        &self.params
    }

    /// Posterior of an observer who has seen every signal so far.
    pub fn true_belief(&self) -> f64 {
        self.true_belief
    }

    pub fn events_fired(&self) -> u64 {
        self.events_fired
    }

    /// Odds-likelihood ratio `p(signal|¬E) / p(signal|E)`.
    pub fn likelihood_ratio(&self, signal: Signal) -> f64 {
        match signal {
            Signal::A => self.params.p_a_given_not_e() / self.params.p_a_given_e,
            Signal::B => self.params.p_b_given_not_e() / self.params.p_b_given_e,
        }
    }

    /// Samples a signal from the marginal rates.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Signal {
        if rng.r#gen::<f64>() < self.params.p_a {
            Signal::A
        } else {
            Signal::B
        }
    }

    /// Updates the true belief with `signal` and returns the ratio applied.
    pub fn absorb(&mut self, signal: Signal) -> Result<f64, SimError> {
        let factor = self.likelihood_ratio(signal);
        self.true_belief = odds_update(self.true_belief, factor)?;
        self.events_fired += 1;
        Ok(factor)
    }
}
