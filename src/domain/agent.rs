//! Market participants and their quoting policy.
//!
//! An agent values a FOR contract at its belief and an AGAINST contract at
//! one minus its belief. Each tick it prices one quote per side off the
//! current books and sizes it with a [`PositionSizer`].

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::bayesian::{odds_update, trust_weighted};
use super::error::SimError;
use super::order::{AgentId, Side};
use super::order_book::OrderBooks;
use super::sizing::PositionSizer;

/// Decimal places kept on seed prices derived from a belief.
pub const PRICE_DP: u32 = 6;

/// Market-wide quoting parameters shared by all agents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotePolicy {
    /// Minimum increment when outbidding a standing quote.
    pub tick_size: Decimal,
    /// Edge an order must beat before it is generated.
    pub min_edge: f64,
}

/// A priced and sized intent to buy `quantity` unit contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub owner: AgentId,
    pub side: Side,
    pub price: Decimal,
    pub quantity: u64,
}

/// A trader with a private belief, a budget and a contract position.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    belief: f64,
    risk_factor: f64,
    trust: f64,
    wealth: Decimal,
    n_for: u64,
    n_against: u64,
}

impl Agent {
    pub fn new(id: AgentId, belief: f64, risk_factor: f64, trust: f64, wealth: Decimal) -> Self {
        Self {
            id,
            belief,
            risk_factor,
            trust,
            wealth,
            n_for: 0,
            n_against: 0,
        }
    }

    /// Starts the agent with an existing position.
    pub fn with_holdings(mut self, n_for: u64, n_against: u64) -> Self {
        self.n_for = n_for;
        self.n_against = n_against;
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn belief(&self) -> f64 {
        self.belief
    }

    pub fn trust(&self) -> f64 {
        self.trust
    }

    pub fn risk_factor(&self) -> f64 {
        self.risk_factor
    }

    pub fn wealth(&self) -> Decimal {
        self.wealth
    }

    pub fn n_for(&self) -> u64 {
        self.n_for
    }

    pub fn n_against(&self) -> u64 {
        self.n_against
    }

    /// Contracts held on `side`.
    pub fn holding(&self, side: Side) -> u64 {
        match side {
            Side::For => self.n_for,
            Side::Against => self.n_against,
        }
    }

    /// Subjective value of one contract on `side`.
    pub fn valuation(&self, side: Side) -> f64 {
        match side {
            Side::For => self.belief,
            Side::Against => 1.0 - self.belief,
        }
    }

    /// True when the agent can pay `price` for a `side` contract, either
    /// from wealth or by netting an opposite contract it already holds.
    pub fn can_afford(&self, side: Side, price: Decimal) -> bool {
        self.wealth >= price || self.holding(side.opposite()) >= 1
    }

    // ── Quoting ─────────────────────────────────────────────

    /// Quote for FOR contracts, if any is worth placing.
    pub fn quote_for(
        &self,
        books: &OrderBooks,
        market_price: Option<Decimal>,
        policy: &QuotePolicy,
    ) -> Option<Quote> {
        self.quote(Side::For, books, market_price, policy)
    }

    /// Quote for AGAINST contracts, if any is worth placing.
    pub fn quote_against(
        &self,
        books: &OrderBooks,
        market_price: Option<Decimal>,
        policy: &QuotePolicy,
    ) -> Option<Quote> {
        self.quote(Side::Against, books, market_price, policy)
    }

    /// Prices and sizes a quote on `side`.
    ///
    /// Returns `None` when the price falls outside (0, 1) or the sized
    /// quantity is zero.
    pub fn quote(
        &self,
        side: Side,
        books: &OrderBooks,
        market_price: Option<Decimal>,
        policy: &QuotePolicy,
    ) -> Option<Quote> {
        let price = self.quote_price(side, books, market_price, policy.tick_size)?;
        if price <= Decimal::ZERO || price >= Decimal::ONE {
            return None;
        }

        let edge = self.valuation(side) - price.to_f64()?;
        let sizer = PositionSizer::new(self.risk_factor, policy.min_edge);
        let quantity = sizer.quantity(edge, self.wealth, price, self.holding(side.opposite()));

        (quantity > 0).then_some(Quote {
            owner: self.id,
            side,
            price,
            quantity,
        })
    }

    /// Price rule, in order of precedence:
    /// 1. complement of the best opposing order,
    /// 2. one tick above the best same-side order,
    /// 3. one tick above the market price (in this side's denomination),
    /// 4. half the agent's own valuation when nothing has traded yet.
    fn quote_price(
        &self,
        side: Side,
        books: &OrderBooks,
        market_price: Option<Decimal>,
        tick: Decimal,
    ) -> Option<Decimal> {
        if let Some(opposing) = books.best_price(side.opposite()) {
            return Some(Decimal::ONE - opposing);
        }
        if let Some(same) = books.best_price(side) {
            return Some(same + tick);
        }
        match (side, market_price) {
            (Side::For, Some(mp)) => Some(mp + tick),
            (Side::Against, Some(mp)) => Some((Decimal::ONE - mp) + tick),
            (_, None) => {
                Decimal::from_f64(self.valuation(side) / 2.0).map(|p| p.round_dp(PRICE_DP))
            }
        }
    }

    // ── Settlement ──────────────────────────────────────────

    /// Books one purchased contract at `cost`.
    ///
    /// If the purchase leaves the agent holding both sides, exactly one
    /// pair is redeemed for 1 unit of currency. Returns whether a pair was
    /// netted.
    pub fn settle_purchase(&mut self, side: Side, cost: Decimal) -> bool {
        self.wealth -= cost;
        match side {
            Side::For => self.n_for += 1,
            Side::Against => self.n_against += 1,
        }

        if self.n_for > 0 && self.n_against > 0 {
            self.n_for -= 1;
            self.n_against -= 1;
            self.wealth += Decimal::ONE;
            return true;
        }
        false
    }

    // ── Learning ────────────────────────────────────────────

    /// Applies an exact evidence likelihood ratio.
    pub fn absorb_evidence(&mut self, factor: f64) -> Result<f64, SimError> {
        self.belief = odds_update(self.belief, factor)?;
        Ok(self.belief)
    }

    /// Applies a market-implied likelihood ratio, discounted by trust.
    pub fn absorb_market(&mut self, ratio: f64) -> Result<f64, SimError> {
        self.belief = odds_update(self.belief, trust_weighted(ratio, self.trust))?;
        Ok(self.belief)
    }

    /// Serializable view for reporting.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            belief: self.belief,
            n_for: self.n_for,
            n_against: self.n_against,
            wealth: self.wealth,
        }
    }
}

/// End-of-run view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub belief: f64,
    pub n_for: u64,
    pub n_against: u64,
    pub wealth: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Order;
    use rust_decimal_macros::dec;

    fn policy() -> QuotePolicy {
        QuotePolicy {
            tick_size: dec!(0.01),
            min_edge: 0.0,
        }
    }

    fn agent(belief: f64) -> Agent {
        Agent::new(AgentId(0), belief, 1.0, 0.5, dec!(100))
    }

    #[test]
    fn test_seed_price_is_half_valuation() {
        let books = OrderBooks::default();
        let a = agent(0.75);
        let q = a.quote_for(&books, None, &policy()).unwrap();
        assert_eq!(q.price, dec!(0.375));
        // edge 0.375 → 37 contracts, affordable 266
        assert_eq!(q.quantity, 37);

        let q = a.quote_against(&books, None, &policy()).unwrap();
        assert_eq!(q.price, dec!(0.125));
        assert_eq!(q.quantity, 12);
    }

    #[test]
    fn test_market_price_plus_tick() {
        let books = OrderBooks::default();
        let a = agent(0.9);
        let q = a.quote_for(&books, Some(dec!(0.5)), &policy()).unwrap();
        assert_eq!(q.price, dec!(0.51));

        let b = agent(0.1);
        let q = b.quote_against(&books, Some(dec!(0.6)), &policy()).unwrap();
        assert_eq!(q.price, dec!(0.41));
    }

    #[test]
    fn test_opposing_book_takes_precedence() {
        let mut books = OrderBooks::default();
        books.insert(Order::new(Side::For, dec!(0.45), 0, AgentId(1)));
        books.insert(Order::new(Side::Against, dec!(0.30), 1, AgentId(2)));
        let q = agent(0.9).quote_for(&books, Some(dec!(0.5)), &policy()).unwrap();
        assert_eq!(q.price, dec!(0.70));
    }

    #[test]
    fn test_same_side_outbid_when_opposing_empty() {
        let mut books = OrderBooks::default();
        books.insert(Order::new(Side::For, dec!(0.45), 0, AgentId(1)));
        let q = agent(0.9).quote_for(&books, None, &policy()).unwrap();
        assert_eq!(q.price, dec!(0.46));
    }

    #[test]
    fn test_no_quote_without_edge() {
        let books = OrderBooks::default();
        assert!(agent(0.5).quote_for(&books, Some(dec!(0.6)), &policy()).is_none());
    }

    #[test]
    fn test_no_quote_outside_unit_interval() {
        let mut only_for = OrderBooks::default();
        only_for.insert(Order::new(Side::For, dec!(0.995), 0, AgentId(1)));
        assert!(agent(1.0).quote_for(&only_for, None, &policy()).is_none());
    }

    #[test]
    fn test_budget_caps_quantity() {
        let books = OrderBooks::default();
        let poor = Agent::new(AgentId(3), 0.9, 1.0, 0.5, dec!(1.0));
        let q = poor.quote_for(&books, Some(dec!(0.49)), &policy()).unwrap();
        assert_eq!(q.price, dec!(0.50));
        assert_eq!(q.quantity, 2);
    }

    #[test]
    fn test_offsetting_position_extends_budget() {
        let books = OrderBooks::default();
        let broke = Agent::new(AgentId(3), 0.9, 1.0, 0.5, dec!(0)).with_holdings(0, 3);
        let q = broke.quote_for(&books, Some(dec!(0.49)), &policy()).unwrap();
        assert_eq!(q.quantity, 3);
    }

    #[test]
    fn test_settlement_nets_one_pair() {
        let mut a = agent(0.5).with_holdings(0, 2);
        let netted = a.settle_purchase(Side::For, dec!(0.3));
        assert!(netted);
        assert_eq!((a.n_for(), a.n_against()), (0, 1));
        assert_eq!(a.wealth(), dec!(100.7));
    }

    #[test]
    fn test_settlement_without_overlap() {
        let mut a = agent(0.5);
        assert!(!a.settle_purchase(Side::Against, dec!(0.45)));
        assert_eq!(a.n_against(), 1);
        assert_eq!(a.wealth(), dec!(99.55));
    }

    #[test]
    fn test_trust_discounts_market_signal() {
        let mut trusting = Agent::new(AgentId(0), 0.5, 1.0, 1.0, dec!(1));
        let mut sceptic = Agent::new(AgentId(1), 0.5, 1.0, 0.0, dec!(1));
        trusting.absorb_market(0.5).unwrap();
        sceptic.absorb_market(0.5).unwrap();
        assert!(trusting.belief() > 0.66);
        assert_eq!(sceptic.belief(), 0.5);
    }
}
