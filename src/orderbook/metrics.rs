//! Order book summary metrics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BookPair;

/// Snapshot summary of both sides of the book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetrics {
    /// Highest bid price
    pub best_bid: Option<Decimal>,

    /// Lowest ask price
    pub best_ask: Option<Decimal>,

    /// Total resting bid size
    pub bid_depth: u64,

    /// Total resting ask size
    pub ask_depth: u64,

    /// Number of bid levels
    pub bid_levels: usize,

    /// Number of ask levels
    pub ask_levels: usize,

    /// Number of live bid orders
    pub bid_orders: usize,

    /// Number of live ask orders
    pub ask_orders: usize,
}

impl BookMetrics {
    /// Summarise the current state of both books
    pub fn from_books(books: &BookPair) -> Self {
        let bids = books.bids();
        let asks = books.asks();
        Self {
            best_bid: bids.best_price(),
            best_ask: asks.best_price(),
            bid_depth: bids.total_size(),
            ask_depth: asks.total_size(),
            bid_levels: bids.level_count(),
            ask_levels: asks.level_count(),
            bid_orders: bids.order_count(),
            ask_orders: asks.order_count(),
        }
    }

    /// Best ask minus best bid, when both sides are populated
    ///
    /// The sides are never matched against each other, so this can be negative.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}
