//! Order book module
//!
//! Maintains per-side order state from add/reduce events and walks price
//! levels to price a fixed-size execution.

mod book;
mod metrics;
mod pair;

pub use book::{OrderBook, RestingOrder};
pub use metrics::BookMetrics;
pub use pair::BookPair;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

/// Opaque order identifier taken verbatim from the feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single aggregated level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub size: u64,
}

/// Outcome of walking one side of the book for a target size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "lowercase")]
pub enum Notional {
    /// Total of price x filled size across the visited levels
    Filled(Decimal),
    /// The side holds less than the target size
    Insufficient,
}

impl Notional {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Notional::Filled(amount) => Some(*amount),
            Notional::Insufficient => None,
        }
    }

    /// Round a filled amount to `dp` decimals, half away from zero
    pub fn round_dp(self, dp: u32) -> Self {
        match self {
            Notional::Filled(amount) => {
                Notional::Filled(amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
            }
            Notional::Insufficient => Notional::Insufficient,
        }
    }
}
