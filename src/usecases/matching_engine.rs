//! Matching Engine - Clearing Loop
//!
//! Repeatedly inspects the best FOR and best AGAINST orders:
//! - Discards a best order whose owner can no longer pay for it
//! - Trades when the two prices jointly cover the unit payout
//! - Stops at the first non-crossing pair or an empty book
//!
//! Both books are price-ranked, so once the best pair fails to cross no
//! deeper pair is tried this pass.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::error::SimError;
use crate::domain::market::{Market, Settlement};
use crate::domain::order::{Order, Side};
use crate::domain::order_book::OrderBooks;

/// One executed FOR/AGAINST match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
  pub for_order: Order,
  pub against_order: Order,
  /// Trade price in FOR terms.
  pub price: Decimal,
  pub for_leg: Settlement,
  pub against_leg: Settlement,
}

/// Outcome of one clearing pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClearingReport {
  pub fills: Vec<Fill>,
  /// Orders dropped because their owner could not pay.
  pub discarded: Vec<Order>,
}

impl ClearingReport {
  pub fn is_empty(&self) -> bool {
    self.fills.is_empty() && self.discarded.is_empty()
  }

  /// Price of the last fill in this pass.
  pub fn last_price(&self) -> Option<Decimal> {
    self.fills.last().map(|f| f.price)
  }
}

/// Trade occurs iff the two claims jointly cover the full payout.
pub fn crosses(for_price: Decimal, against_price: Decimal) -> bool {
  for_price + against_price >= Decimal::ONE
}

/// Trade price: the price of whichever leg was submitted first.
///
/// FOR older → `for.price`; otherwise → `1 - against.price`.
pub fn trade_price(for_order: &Order, against_order: &Order) -> Decimal {
  if for_order.is_older_than(against_order) {
    for_order.price
  } else {
    Decimal::ONE - against_order.price
  }
}

/// Stateless clearing logic plus running totals.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
  total_fills: u64,
  total_discarded: u64,
}

impl MatchingEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn total_fills(&self) -> u64 {
    self.total_fills
  }

  pub fn total_discarded(&self) -> u64 {
    self.total_discarded
  }

  /// Clears the books as far as they cross.
  ///
  /// # Errors
  /// Only if a resting order names an agent the market does not know.
  pub fn clear(
    &mut self,
    books: &mut OrderBooks,
    market: &mut Market,
  ) -> Result<ClearingReport, SimError> {
    let mut report = ClearingReport::default();

    loop {
      let (Some(best_for), Some(best_against)) = (
        books.book(Side::For).peek_best(),
        books.book(Side::Against).peek_best(),
      ) else {
        break;
      };
      let (for_owner, for_price) = (best_for.owner, best_for.price);
      let (against_owner, against_price) = (best_against.owner, best_against.price);

      if !market.can_afford(for_owner, Side::For, for_price)? {
        self.discard(books, Side::For, &mut report);
        continue;
      }
      if !market.can_afford(against_owner, Side::Against, against_price)? {
        self.discard(books, Side::Against, &mut report);
        continue;
      }

      if !crosses(for_price, against_price) {
        trace!(%for_price, %against_price, "Best pair does not cross");
        break;
      }

      let (Some(for_order), Some(against_order)) = (
        books.book_mut(Side::For).pop_best(),
        books.book_mut(Side::Against).pop_best(),
      ) else {
        break;
      };

      let price = trade_price(&for_order, &against_order);
      let for_leg = market.buy_for(for_order.owner, price)?;
      let against_leg = market.buy_against(against_order.owner, price)?;
      market.set_market_price(price);
      self.total_fills += 1;

      debug!(
        %price,
        buyer_for = %for_order.owner,
        buyer_against = %against_order.owner,
        for_seq = for_order.sequence,
        against_seq = against_order.sequence,
        "Trade executed"
      );

      report.fills.push(Fill {
        for_order,
        against_order,
        price,
        for_leg,
        against_leg,
      });
    }

    Ok(report)
  }

  fn discard(&mut self, books: &mut OrderBooks, side: Side, report: &mut ClearingReport) {
    if let Some(order) = books.book_mut(side).pop_best() {
      debug!(
        %side,
        owner = %order.owner,
        price = %order.price,
        seq = order.sequence,
        "Discarding unaffordable order"
      );
      self.total_discarded += 1;
      report.discarded.push(order);
    }
  }
}
