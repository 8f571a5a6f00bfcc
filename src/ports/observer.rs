//! Observer Port - Per-Tick Run Telemetry
//!
//! The simulation hands a [`TickSnapshot`] to an observer after every
//! tick. Observers are synchronous and infallible: they record, they do
//! not steer the run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::evidence::Signal;
use crate::domain::phase::Phase;

/// State of the market at the end of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
  /// Zero-based tick index.
  pub tick: u64,
  /// Phase the tick ran in.
  pub phase: Phase,
  /// Last trade price, if any trade has happened.
  pub market_price: Option<Decimal>,
  /// Evidence source belief after this tick.
  pub true_belief: f64,
  /// Population mean belief.
  pub average_belief: f64,
  /// Trades executed this tick.
  pub trades: usize,
  /// Orders discarded this tick.
  pub discarded: usize,
  /// Resting FOR orders after the tick.
  pub depth_for: usize,
  /// Resting AGAINST orders after the tick.
  pub depth_against: usize,
  /// Signal revealed this tick, if evidence fired.
  pub evidence: Option<Signal>,
}

/// Receives one snapshot per tick.
pub trait TickObserver {
  fn on_tick(&mut self, snapshot: &TickSnapshot);
}

/// Discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TickObserver for NoopObserver {
  fn on_tick(&mut self, _snapshot: &TickSnapshot) {}
}

impl TickObserver for Vec<TickSnapshot> {
  fn on_tick(&mut self, snapshot: &TickSnapshot) {
    self.push(snapshot.clone());
  }
}
