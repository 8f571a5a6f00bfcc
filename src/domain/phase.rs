//! Run phases.
//!
//! ```text
//! WARMUP ──first trade──▶ EVIDENCE_PHASE ──evidence_end──▶ EXTRA_TRADING ──last tick──▶ TERMINAL
//! ```
//!
//! A run that reaches `evidence_end` before any trade goes straight from
//! warmup to extra trading.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No market price yet; quotes are seeded from beliefs.
    Warmup,
    /// Evidence and price learning interleave with trading.
    EvidencePhase,
    /// Evidence has stopped; agents keep trading on fixed beliefs.
    ExtraTrading,
    /// The run is over.
    Terminal,
}

impl Phase {
    /// Phase of `tick` in a run of `num_iterations` ticks.
    pub fn at(tick: u64, evidence_end: u64, num_iterations: u64, has_price: bool) -> Self {
        if tick >= num_iterations {
            Self::Terminal
        } else if tick >= evidence_end {
            Self::ExtraTrading
        } else if has_price {
            Self::EvidencePhase
        } else {
            Self::Warmup
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warmup => write!(f, "WARMUP"),
            Self::EvidencePhase => write!(f, "EVIDENCE_PHASE"),
            Self::ExtraTrading => write!(f, "EXTRA_TRADING"),
            Self::Terminal => write!(f, "TERMINAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_progression() {
        assert_eq!(Phase::at(0, 10, 15, false), Phase::Warmup);
        assert_eq!(Phase::at(3, 10, 15, true), Phase::EvidencePhase);
        assert_eq!(Phase::at(10, 10, 15, true), Phase::ExtraTrading);
        assert_eq!(Phase::at(12, 10, 15, false), Phase::ExtraTrading);
        assert_eq!(Phase::at(15, 10, 15, true), Phase::Terminal);
    }
}
