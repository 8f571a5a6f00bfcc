//! Domain error types.
//!
//! Insufficient funds and empty books are normal matching-engine branches,
//! not errors. Only states the simulation cannot represent end up here.

use thiserror::Error;

use super::order::AgentId;

/// Errors raised by the domain layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A probability fell outside `[0, 1]` or was not finite.
    #[error("probability {value} is outside [0, 1] ({context})")]
    ProbabilityOutOfRange { value: f64, context: &'static str },

    /// An odds-likelihood ratio was negative, NaN or infinite.
    #[error("degenerate likelihood ratio {factor} ({context})")]
    DegenerateLikelihood { factor: f64, context: &'static str },

    /// A market price at 0 or 1 has no finite odds.
    #[error("market price {price} has no finite odds")]
    DegeneratePrice { price: f64 },

    /// An order or lookup referenced an agent that does not exist.
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
}
