//! Run History - In-memory Tick Recorder and Accuracy Metrics
//!
//! Records every tick snapshot of a run and measures how well the
//! market price tracked the evidence source's belief.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::observer::{TickObserver, TickSnapshot};

/// Price-tracking accuracy of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Pearson correlation of price and true belief, over ticks with a price.
    pub correlation: Option<f64>,
    /// `true_belief - market_price` at the last tick.
    pub final_gap: Option<f64>,
    /// Mean absolute gap over ticks with a price.
    pub mean_abs_gap: Option<f64>,
}

/// Collects tick snapshots as a [`TickObserver`].
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    ticks: Vec<TickSnapshot>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[TickSnapshot] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// `(market_price, true_belief)` for every tick that had a price.
    pub fn priced_series(&self) -> Vec<(f64, f64)> {
        self.ticks
            .iter()
            .filter_map(|t| {
                t.market_price
                    .and_then(|p| p.to_f64())
                    .map(|p| (p, t.true_belief))
            })
            .collect()
    }

    pub fn total_trades(&self) -> usize {
        self.ticks.iter().map(|t| t.trades).sum()
    }

    /// Pearson correlation of price against true belief.
    ///
    /// `None` with fewer than two priced ticks or when either series is flat.
    pub fn price_truth_correlation(&self) -> Option<f64> {
        pearson(&self.priced_series())
    }

    /// Gap between true belief and price at the last tick.
    pub fn final_gap(&self) -> Option<f64> {
        let last = self.ticks.last()?;
        let price = last.market_price?.to_f64()?;
        Some(last.true_belief - price)
    }

    pub fn mean_abs_gap(&self) -> Option<f64> {
        let series = self.priced_series();
        if series.is_empty() {
            return None;
        }
        let total: f64 = series.iter().map(|(p, t)| (t - p).abs()).sum();
        Some(total / series.len() as f64)
    }

    pub fn accuracy(&self) -> AccuracyReport {
        AccuracyReport {
            correlation: self.price_truth_correlation(),
            final_gap: self.final_gap(),
            mean_abs_gap: self.mean_abs_gap(),
        }
    }
}

impl TickObserver for RunHistory {
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        debug!(
            tick = snapshot.tick,
            phase = %snapshot.phase,
            trades = snapshot.trades,
            "Tick recorded"
        );
        self.ticks.push(snapshot.clone());
    }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(cov / denom)
}
