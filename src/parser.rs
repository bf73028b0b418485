//! Parser module for feed lines
//!
//! Turns one whitespace-separated line of the market data feed into an [`Event`]:
//!
//! ```text
//! 28800538 A b S 44.26 100    add order b: sell (ask) 100 @ 44.26
//! 28800744 R b 100            reduce order b by 100
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::PricerError;
use crate::orderbook::{OrderId, Side};

/// One market data event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Feed timestamp, echoed into emissions and never used for ordering
    pub timestamp: u64,
    pub order_id: OrderId,
    pub kind: EventKind,
}

/// Add or reduce payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Add { side: Side, price: Decimal, size: u64 },
    Reduce { size: u64 },
}

impl Event {
    pub fn add(timestamp: u64, order_id: impl Into<String>, side: Side, price: Decimal, size: u64) -> Self {
        Self {
            timestamp,
            order_id: OrderId::new(order_id),
            kind: EventKind::Add { side, price, size },
        }
    }

    pub fn reduce(timestamp: u64, order_id: impl Into<String>, size: u64) -> Self {
        Self {
            timestamp,
            order_id: OrderId::new(order_id),
            kind: EventKind::Reduce { size },
        }
    }
}

impl FromStr for Event {
    type Err = PricerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields.as_slice() {
            [timestamp, "A", order_id, side, price, size] => Ok(Event::add(
                parse_timestamp(timestamp)?,
                *order_id,
                parse_side(side)?,
                parse_price(price)?,
                parse_size(size)?,
            )),
            [timestamp, "R", order_id, size] => Ok(Event::reduce(
                parse_timestamp(timestamp)?,
                *order_id,
                parse_size(size)?,
            )),
            [_, kind, ..] if *kind != "A" && *kind != "R" => {
                Err(PricerError::ParseError(format!("Unknown event type: {}", kind)))
            }
            _ => Err(PricerError::ParseError(format!(
                "Unexpected field count {} in line: {}",
                fields.len(),
                line.trim()
            ))),
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<u64, PricerError> {
    raw.parse()
        .map_err(|e| PricerError::ParseError(format!("Invalid timestamp {:?}: {}", raw, e)))
}

fn parse_side(raw: &str) -> Result<Side, PricerError> {
    match raw {
        "B" => Ok(Side::Bid),
        "S" => Ok(Side::Ask),
        other => Err(PricerError::ParseError(format!("Unknown side: {}", other))),
    }
}

fn parse_price(raw: &str) -> Result<Decimal, PricerError> {
    let price = Decimal::from_str(raw)
        .map_err(|e| PricerError::ParseError(format!("Invalid price {:?}: {}", raw, e)))?;
    if price <= Decimal::ZERO {
        return Err(PricerError::ParseError(format!("Price must be positive: {}", raw)));
    }
    Ok(price)
}

fn parse_size(raw: &str) -> Result<u64, PricerError> {
    let size: u64 = raw
        .parse()
        .map_err(|e| PricerError::ParseError(format!("Invalid size {:?}: {}", raw, e)))?;
    if size == 0 {
        return Err(PricerError::ParseError("Size must be positive".to_string()));
    }
    Ok(size)
}
