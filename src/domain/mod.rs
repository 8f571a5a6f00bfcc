//! Domain layer - Core market logic and models.
//!
//! Pure, synchronous logic: orders and books, agents and their quoting
//! policy, the settlement ledger, Bayesian updates and the evidence
//! source. Nothing here performs I/O.

pub mod agent;
pub mod bayesian;
pub mod error;
pub mod evidence;
pub mod market;
pub mod order;
pub mod order_book;
pub mod phase;
pub mod sizing;

// Re-export core types for convenience
pub use agent::{Agent, AgentSnapshot, Quote, QuotePolicy};
pub use error::SimError;
pub use evidence::{EvidenceParams, EvidenceSource, Signal};
pub use market::{Market, Settlement};
pub use order::{AgentId, Order, Sequence, SequenceCounter, Side};
pub use order_book::{OrderBook, OrderBooks, PriceRanking};
pub use phase::Phase;
pub use sizing::PositionSizer;
