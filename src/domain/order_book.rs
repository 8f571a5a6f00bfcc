//! Per-side order books with price-time priority.
//!
//! Ordering is an explicit key handed to the priority queue: the ranked
//! price first, then the submission sequence (older wins). Orders are
//! never re-prioritised in place; they are only inserted and removed.

use std::cmp::Reverse;

use priority_queue::PriorityQueue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{Order, Sequence, Side};

/// Which end of the price range a book serves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRanking {
    /// Highest price is best (a bid book).
    #[default]
    HighestPrice,
    /// Lowest price is best.
    LowestPrice,
}

/// Priority key: larger keys leave the book first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BookKey {
    rank: Decimal,
    age: Reverse<Sequence>,
}

impl BookKey {
    /// Builds the key for `order` under `ranking`.
    pub fn for_order(order: &Order, ranking: PriceRanking) -> Self {
        let rank = match ranking {
            PriceRanking::HighestPrice => order.price,
            PriceRanking::LowestPrice => -order.price,
        };
        Self {
            rank,
            age: Reverse(order.sequence),
        }
    }
}

/// One side of the market.
#[derive(Debug, Clone)]
pub struct OrderBook {
    side: Side,
    ranking: PriceRanking,
    queue: PriorityQueue<Order, BookKey>,
}

impl OrderBook {
    pub fn new(side: Side, ranking: PriceRanking) -> Self {
        Self {
            side,
            ranking,
            queue: PriorityQueue::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn ranking(&self) -> PriceRanking {
        self.ranking
    }

    /// Adds an order. O(log n).
    ///
    /// Only reachable through [`OrderBooks::insert`], which routes by side.
    pub(crate) fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.side, self.side, "order routed to wrong book");
        let key = BookKey::for_order(&order, self.ranking);
        self.queue.push(order, key);
    }

    /// Best order without removing it.
    pub fn peek_best(&self) -> Option<&Order> {
        self.queue.peek().map(|(order, _)| order)
    }

    /// Removes and returns the best order.
    pub fn pop_best(&mut self) -> Option<Order> {
        self.queue.pop().map(|(order, _)| order)
    }

    /// Price of the best order.
    pub fn best_price(&self) -> Option<Decimal> {
        self.peek_best().map(|o| o.price)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The FOR and AGAINST books of the single market.
#[derive(Debug, Clone)]
pub struct OrderBooks {
    for_book: OrderBook,
    against_book: OrderBook,
}

impl OrderBooks {
    /// FOR is always ranked highest-price-first; AGAINST uses `against_ranking`.
    pub fn new(against_ranking: PriceRanking) -> Self {
        Self {
            for_book: OrderBook::new(Side::For, PriceRanking::HighestPrice),
            against_book: OrderBook::new(Side::Against, against_ranking),
        }
    }

    pub fn book(&self, side: Side) -> &OrderBook {
        match side {
            Side::For => &self.for_book,
            Side::Against => &self.against_book,
        }
    }

    pub fn book_mut(&mut self, side: Side) -> &mut OrderBook {
        match side {
            Side::For => &mut self.for_book,
            Side::Against => &mut self.against_book,
        }
    }

    /// Routes an order to its side's book.
    pub fn insert(&mut self, order: Order) {
        self.book_mut(order.side).insert(order);
    }

    pub fn best_price(&self, side: Side) -> Option<Decimal> {
        self.book(side).best_price()
    }

    /// Resting order counts as `(for, against)`.
    pub fn depths(&self) -> (usize, usize) {
        (self.for_book.len(), self.against_book.len())
    }
}

impl Default for OrderBooks {
    fn default() -> Self {
        Self::new(PriceRanking::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::AgentId;
    use rust_decimal_macros::dec;

    fn order(side: Side, price: Decimal, seq: Sequence) -> Order {
        Order::new(side, price, seq, AgentId(0))
    }

    #[test]
    fn test_empty_book_signals_none() {
        let mut book = OrderBook::new(Side::For, PriceRanking::HighestPrice);
        assert!(book.peek_best().is_none());
        assert!(book.pop_best().is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_highest_price_first() {
        let mut book = OrderBook::new(Side::For, PriceRanking::HighestPrice);
        book.insert(order(Side::For, dec!(0.40), 0));
        book.insert(order(Side::For, dec!(0.55), 1));
        book.insert(order(Side::For, dec!(0.47), 2));

        assert_eq!(book.best_price(), Some(dec!(0.55)));
        let prices: Vec<_> = std::iter::from_fn(|| book.pop_best()).map(|o| o.price).collect();
        assert_eq!(prices, vec![dec!(0.55), dec!(0.47), dec!(0.40)]);
    }

    #[test]
    fn test_lowest_price_ranking() {
        let mut book = OrderBook::new(Side::Against, PriceRanking::LowestPrice);
        book.insert(order(Side::Against, dec!(0.40), 0));
        book.insert(order(Side::Against, dec!(0.25), 1));
        book.insert(order(Side::Against, dec!(0.60), 2));
        assert_eq!(book.pop_best().map(|o| o.price), Some(dec!(0.25)));
        assert_eq!(book.pop_best().map(|o| o.price), Some(dec!(0.40)));
    }

    #[test]
    fn test_equal_prices_fifo() {
        for ranking in [PriceRanking::HighestPrice, PriceRanking::LowestPrice] {
            let mut book = OrderBook::new(Side::For, ranking);
            book.insert(order(Side::For, dec!(0.50), 9));
            book.insert(order(Side::For, dec!(0.50), 4));
            book.insert(order(Side::For, dec!(0.50), 6));
            let seqs: Vec<_> = std::iter::from_fn(|| book.pop_best()).map(|o| o.sequence).collect();
            assert_eq!(seqs, vec![4, 6, 9], "ranking {ranking:?}");
        }
    }

    #[test]
    fn test_books_route_by_side() {
        let mut books = OrderBooks::default();
        books.insert(order(Side::For, dec!(0.30), 0));
        books.insert(order(Side::Against, dec!(0.60), 1));
        books.insert(order(Side::Against, dec!(0.65), 2));
        assert_eq!(books.depths(), (1, 2));
        assert_eq!(books.best_price(Side::Against), Some(dec!(0.65)));
    }

    #[test]
    fn test_every_routed_order_is_kept() {
        let mut books = OrderBooks::new(PriceRanking::LowestPrice);
        for seq in 0..10 {
            let side = if seq % 3 == 0 { Side::Against } else { Side::For };
            books.insert(order(side, dec!(0.50), seq));
        }
        assert_eq!(books.depths(), (6, 4));
        assert_eq!(books.book(Side::For).side(), Side::For);
        assert_eq!(books.book(Side::Against).ranking(), PriceRanking::LowestPrice);
    }
}
