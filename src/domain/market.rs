//! Market ledger: agents, prices and settlement.
//!
//! Prices are always quoted in FOR terms here. A FOR buyer pays the trade
//! price, an AGAINST buyer pays its complement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, AgentSnapshot};
use super::error::SimError;
use super::order::{AgentId, Side};

/// Result of settling one leg of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub agent: AgentId,
    pub side: Side,
    /// Amount debited before any netting credit.
    pub cost: Decimal,
    /// Whether a FOR/AGAINST pair was redeemed for 1.
    pub netted: bool,
}

/// The single binary market and everyone trading in it.
#[derive(Debug, Clone)]
pub struct Market {
    agents: Vec<Agent>,
    market_price: Option<Decimal>,
    previous_market_price: Option<Decimal>,
}

impl Market {
    /// Agents must be indexed by position: `agents[i].id() == AgentId(i)`.
    pub fn new(agents: Vec<Agent>) -> Self {
        debug_assert!(agents.iter().enumerate().all(|(i, a)| a.id() == AgentId(i)));
        Self {
            agents,
            market_price: None,
            previous_market_price: None,
        }
    }

    /// Starts the market with a price as if a trade had already happened.
    pub fn with_market_price(mut self, price: Decimal) -> Self {
        self.market_price = Some(price);
        self
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent(&self, id: AgentId) -> Result<&Agent, SimError> {
        self.agents.get(id.0).ok_or(SimError::UnknownAgent(id))
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent, SimError> {
        self.agents.get_mut(id.0).ok_or(SimError::UnknownAgent(id))
    }

    /// Price of the most recent trade, in FOR terms.
    pub fn market_price(&self) -> Option<Decimal> {
        self.market_price
    }

    /// Price captured at the start of the last learning cycle.
    pub fn previous_market_price(&self) -> Option<Decimal> {
        self.previous_market_price
    }

    /// Records the price of a completed trade.
    pub fn set_market_price(&mut self, price: Decimal) {
        self.market_price = Some(price);
    }

    /// Freezes the current price as the learning baseline.
    pub fn snapshot_previous_price(&mut self) {
        self.previous_market_price = self.market_price;
    }

    /// Whether `id` can pay `price` (in the order's own denomination) for a
    /// `side` contract.
    pub fn can_afford(&self, id: AgentId, side: Side, price: Decimal) -> Result<bool, SimError> {
        Ok(self.agent(id)?.can_afford(side, price))
    }

    /// Settles one contract bought at `trade_price` (FOR terms).
    pub fn buy(&mut self, id: AgentId, side: Side, trade_price: Decimal) -> Result<Settlement, SimError> {
        let cost = match side {
            Side::For => trade_price,
            Side::Against => Decimal::ONE - trade_price,
        };
        let netted = self.agent_mut(id)?.settle_purchase(side, cost);
        Ok(Settlement {
            agent: id,
            side,
            cost,
            netted,
        })
    }

    pub fn buy_for(&mut self, id: AgentId, trade_price: Decimal) -> Result<Settlement, SimError> {
        self.buy(id, Side::For, trade_price)
    }

    pub fn buy_against(&mut self, id: AgentId, trade_price: Decimal) -> Result<Settlement, SimError> {
        self.buy(id, Side::Against, trade_price)
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }

    /// Mean agent belief.
    pub fn average_belief(&self) -> Option<f64> {
        if self.agents.is_empty() {
            return None;
        }
        let sum: f64 = self.agents.iter().map(Agent::belief).sum();
        Some(sum / self.agents.len() as f64)
    }
}
