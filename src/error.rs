//! Error types for the pricer

use rust_decimal::Decimal;
use thiserror::Error;

use crate::orderbook::{OrderId, Side};

/// Pricer errors
#[derive(Error, Debug)]
pub enum PricerError {
    #[error("Order {order_id} is already live on the {side} side")]
    DuplicateOrder { order_id: OrderId, side: Side },

    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    #[error("Invalid size {size} for order {order_id}")]
    InvalidSize { order_id: OrderId, size: u64 },

    #[error("Invalid price {price} for order {order_id}")]
    InvalidPrice { order_id: OrderId, price: Decimal },

    #[error("Size at price {price} overflows when adding order {order_id}")]
    SizeOverflow { order_id: OrderId, price: Decimal },

    #[error("Notional for {target_size} on the {side} side overflows")]
    NotionalOverflow { side: Side, target_size: u64 },

    #[error("Target size must be positive, got {0}")]
    InvalidTargetSize(u64),

    #[error("Failed to parse event: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PricerError {
    /// Whether the error means the feed contradicts its own add/reduce protocol
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            PricerError::DuplicateOrder { .. }
                | PricerError::UnknownOrder(_)
                | PricerError::InvalidSize { .. }
                | PricerError::InvalidPrice { .. }
                | PricerError::SizeOverflow { .. }
        )
    }
}

impl From<std::io::Error> for PricerError {
    fn from(err: std::io::Error) -> Self {
        PricerError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(err: serde_json::Error) -> Self {
        PricerError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for PricerError {
    fn from(err: config::ConfigError) -> Self {
        PricerError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PricerError>;
