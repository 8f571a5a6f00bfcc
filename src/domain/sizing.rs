//! Position sizing for agent quotes.
//!
//! Desired size grows linearly with edge: one contract per `risk_unit` of
//! edge, where `risk_unit = 1 / (100 * risk_factor)`. The size actually
//! quoted is capped by what the agent can pay for, counting opposite-side
//! contracts it already holds (each nets out for 1 unit on execution).

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Contracts per unit of edge at `risk_factor = 1`.
pub const CONTRACTS_PER_EDGE: f64 = 100.0;

/// Converts edge and budget into an order quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSizer {
    /// Edge required before any order is generated.
    min_edge: f64,
    /// Contracts per unit of edge (`100 * risk_factor`).
    contracts_per_edge: f64,
}

impl PositionSizer {
    /// `risk_factor` must be positive; configuration enforces this.
    pub fn new(risk_factor: f64, min_edge: f64) -> Self {
        Self {
            min_edge,
            contracts_per_edge: CONTRACTS_PER_EDGE * risk_factor,
        }
    }

    /// Edge consumed per contract. Smaller means larger positions.
    pub fn risk_unit(&self) -> f64 {
        1.0 / self.contracts_per_edge
    }

    pub fn min_edge(&self) -> f64 {
        self.min_edge
    }

    /// Contracts the agent wants at this edge.
    ///
    /// Zero unless `edge > min_edge`.
    pub fn desired(&self, edge: f64) -> u64 {
        if !edge.is_finite() || edge <= self.min_edge || edge <= 0.0 {
            return 0;
        }
        // Float-to-int casts saturate, so a huge edge cannot wrap.
        (edge * self.contracts_per_edge).floor() as u64
    }

    /// Contracts the agent can pay for at `price`.
    ///
    /// `floor(wealth / price)` plus the offsetting position. A non-positive
    /// price or wealth contributes nothing from the budget.
    pub fn affordable(&self, wealth: Decimal, price: Decimal, offsetting: u64) -> u64 {
        if price <= Decimal::ZERO {
            return 0;
        }
        let from_budget = wealth
            .checked_div(price)
            .map(|q| q.floor())
            .and_then(|q| q.to_u64())
            .unwrap_or(0);
        from_budget.saturating_add(offsetting)
    }

    /// Final order quantity: `min(desired, affordable)`.
    pub fn quantity(&self, edge: f64, wealth: Decimal, price: Decimal, offsetting: u64) -> u64 {
        self.desired(edge)
            .min(self.affordable(wealth, price, offsetting))
    }
}
