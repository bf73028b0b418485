//! Core order book implementation
//!
//! One instance per side. Uses BTreeMap for sorted price level management so
//! the execution walk never has to re-sort prices.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{Level, Notional, OrderId, Side};
use crate::error::{PricerError, Result};

/// A live order's fixed price and remaining size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestingOrder {
    pub price: Decimal,
    pub size: u64,
}

/// Order book for a single side of one instrument
#[derive(Debug)]
pub struct OrderBook {
    side: Side,
    /// Live orders keyed by id
    orders: HashMap<OrderId, RestingOrder>,
    /// Aggregate remaining size per price, never holding a zero entry
    levels: BTreeMap<Decimal, u64>,
    /// Open interest across all levels
    total_size: u64,
}

impl OrderBook {
    /// Create a new empty book for one side
    pub fn new(side: Side) -> Self {
        Self {
            side,
            orders: HashMap::new(),
            levels: BTreeMap::new(),
            total_size: 0,
        }
    }

    /// Insert a new order
    pub fn add(&mut self, order_id: OrderId, price: Decimal, size: u64) -> Result<()> {
        if size == 0 {
            return Err(PricerError::InvalidSize { order_id, size });
        }
        if price <= Decimal::ZERO {
            return Err(PricerError::InvalidPrice { order_id, price });
        }
        if self.orders.contains_key(&order_id) {
            return Err(PricerError::DuplicateOrder {
                order_id,
                side: self.side,
            });
        }

        let level_size = self.levels.get(&price).copied().unwrap_or(0);
        let (Some(level_size), Some(total_size)) = (
            level_size.checked_add(size),
            self.total_size.checked_add(size),
        ) else {
            return Err(PricerError::SizeOverflow { order_id, price });
        };

        self.orders.insert(order_id, RestingOrder { price, size });
        self.levels.insert(price, level_size);
        self.total_size = total_size;
        Ok(())
    }

    /// Reduce an order's remaining size, removing it once nothing is left
    ///
    /// A delta at or above the remaining size eliminates the order and only
    /// the order's remaining size is taken off its level.
    pub fn reduce(&mut self, order_id: &OrderId, size_delta: u64) -> Result<()> {
        if size_delta == 0 {
            return Err(PricerError::InvalidSize {
                order_id: order_id.clone(),
                size: size_delta,
            });
        }

        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| PricerError::UnknownOrder(order_id.clone()))?;

        let price = order.price;
        let removed = if size_delta >= order.size {
            let remaining = order.size;
            self.orders.remove(order_id);
            remaining
        } else {
            order.size -= size_delta;
            size_delta
        };

        if let Some(level) = self.levels.get_mut(&price) {
            *level -= removed;
            if *level == 0 {
                self.levels.remove(&price);
            }
        }
        self.total_size -= removed;
        Ok(())
    }

    /// Lowest ask or highest bid, `None` when the side is empty
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Ask => self.levels.first_key_value().map(|(p, _)| *p),
            Side::Bid => self.levels.last_key_value().map(|(p, _)| *p),
        }
    }

    /// Price an immediate execution of `target_size` against this side
    ///
    /// Fails only when the notional does not fit in a `Decimal`.
    pub fn walk_for_size(&self, target_size: u64) -> Result<Notional> {
        if target_size == 0 {
            return Ok(Notional::Filled(Decimal::ZERO));
        }
        if self.total_size < target_size {
            return Ok(Notional::Insufficient);
        }

        let notional = match self.side {
            Side::Ask => fill(self.levels.iter(), target_size),
            Side::Bid => fill(self.levels.iter().rev(), target_size),
        };
        notional.ok_or(PricerError::NotionalOverflow {
            side: self.side,
            target_size,
        })
    }

    /// Price levels in execution order (ascending asks, descending bids)
    pub fn levels(&self) -> Vec<Level> {
        let to_level = |(price, size): (&Decimal, &u64)| Level {
            price: *price,
            size: *size,
        };
        match self.side {
            Side::Ask => self.levels.iter().map(to_level).collect(),
            Side::Bid => self.levels.iter().rev().map(to_level).collect(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Aggregate size resting at `price`
    pub fn size_at(&self, price: Decimal) -> Option<u64> {
        self.levels.get(&price).copied()
    }

    pub fn order(&self, order_id: &OrderId) -> Option<&RestingOrder> {
        self.orders.get(order_id)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.orders.contains_key(order_id)
    }

    /// All live orders, in no particular order
    pub fn orders(&self) -> impl Iterator<Item = (&OrderId, &RestingOrder)> {
        self.orders.iter()
    }
}

/// `None` on overflow
fn fill<'a, I>(levels: I, target_size: u64) -> Option<Notional>
where
    I: Iterator<Item = (&'a Decimal, &'a u64)>,
{
    let mut remaining = target_size;
    let mut notional = Decimal::ZERO;

    for (price, size) in levels {
        let filled = remaining.min(*size);
        notional = notional.checked_add(price.checked_mul(Decimal::from(filled))?)?;
        remaining -= filled;
        if remaining == 0 {
            return Some(Notional::Filled(notional));
        }
    }

    Some(Notional::Insufficient)
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Bid => writeln!(f, "********* BIDS *********")?,
            Side::Ask => writeln!(f, "********* ASKS *********")?,
        }
        for level in self.levels() {
            writeln!(f, "Price: {:.2}, Size: {}", level.price, level.size)?;
        }
        Ok(())
    }
}
