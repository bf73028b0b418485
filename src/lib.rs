//! Book Pricer Library
//!
//! This crate maintains bid and ask limit order books from an add/reduce event
//! feed and tracks what it would cost to buy, and what selling would yield, for
//! a fixed target size.

pub mod config;
pub mod error;
pub mod feed;
pub mod orderbook;
pub mod parser;
pub mod pricer;
pub mod publisher;

pub use config::{Config, ConfigOverrides};
pub use error::{PricerError, Result};
pub use feed::{FeedReader, FeedRunner, RunStats};
pub use orderbook::{BookMetrics, BookPair, Level, Notional, OrderBook, OrderId, Side};
pub use parser::{Event, EventKind};
pub use pricer::{Emission, Pricer, Quantity, QuoteState};
pub use publisher::{OutputFormat, Publisher};
