//! Order value types.
//!
//! An `Order` is a single resting unit quote. It never changes after
//! creation; the book owns it until it is matched or discarded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Index of an agent inside the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contract side.
///
/// A FOR contract pays 1 if the event occurs, an AGAINST contract pays 1
/// if it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    For,
    Against,
}

impl Side {
    /// The complementary contract.
    pub fn opposite(self) -> Self {
        match self {
            Self::For => Self::Against,
            Self::Against => Self::For,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::For => write!(f, "FOR"),
            Self::Against => write!(f, "AGAINST"),
        }
    }
}

/// Submission sequence number. Lower means older.
pub type Sequence = u64;

/// A resting unit order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Contract being bought.
    pub side: Side,
    /// Price in the order's own side denomination, in (0, 1).
    pub price: Decimal,
    /// Position in the run-wide submission order.
    pub sequence: Sequence,
    /// Agent that submitted the order.
    pub owner: AgentId,
}

impl Order {
    pub fn new(side: Side, price: Decimal, sequence: Sequence, owner: AgentId) -> Self {
        Self {
            side,
            price,
            sequence,
            owner,
        }
    }

    /// True when this order was submitted before `other`.
    pub fn is_older_than(&self, other: &Order) -> bool {
        self.sequence < other.sequence
    }
}

/// Run-wide submission counter.
///
/// Owned by the simulation and handed to every submission so that FOR and
/// AGAINST orders share one notion of age.
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    next: Sequence,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number and advances the counter.
    pub fn next(&mut self) -> Sequence {
        let seq = self.next;
        self.next += 1;
        seq
    }

    /// Number of sequence numbers handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_counter_is_monotonic() {
        let mut counter = SequenceCounter::new();
        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.issued(), 3);
    }

    #[test]
    fn test_older_compares_sequences() {
        let a = Order::new(Side::For, dec!(0.40), 3, AgentId(0));
        let b = Order::new(Side::Against, dec!(0.70), 7, AgentId(1));
        assert!(a.is_older_than(&b));
        assert!(!b.is_older_than(&a));
        assert!(!a.is_older_than(&a));
    }

    #[test]
    fn test_side_display_and_opposite() {
        assert_eq!(format!("{}", Side::For), "FOR");
        assert_eq!(format!("{}", Side::Against), "AGAINST");
        assert_eq!(Side::For.opposite(), Side::Against);
    }
}
