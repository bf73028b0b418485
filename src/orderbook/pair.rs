//! Bid and ask books for one instrument
//!
//! Routes add/reduce events to the side that owns them.

use super::{OrderBook, OrderId, Side};
use crate::error::{PricerError, Result};
use crate::parser::{Event, EventKind};

/// Owns the bid-side and ask-side books
#[derive(Debug)]
pub struct BookPair {
    bids: OrderBook,
    asks: OrderBook,
}

impl Default for BookPair {
    fn default() -> Self {
        Self::new()
    }
}

impl BookPair {
    /// Create an empty pair of books
    pub fn new() -> Self {
        Self {
            bids: OrderBook::new(Side::Bid),
            asks: OrderBook::new(Side::Ask),
        }
    }

    /// Apply an event to the side it belongs to
    ///
    /// Returns the side that changed. Order ids are unique across both sides,
    /// so an add whose id is live on either side is rejected.
    pub fn apply(&mut self, event: &Event) -> Result<Side> {
        match &event.kind {
            EventKind::Add { side, price, size } => {
                if let Some(live_side) = self.side_of(&event.order_id) {
                    return Err(PricerError::DuplicateOrder {
                        order_id: event.order_id.clone(),
                        side: live_side,
                    });
                }
                self.book_mut(*side)
                    .add(event.order_id.clone(), *price, *size)?;
                Ok(*side)
            }
            EventKind::Reduce { size } => {
                let side = self
                    .side_of(&event.order_id)
                    .ok_or_else(|| PricerError::UnknownOrder(event.order_id.clone()))?;
                self.book_mut(side).reduce(&event.order_id, *size)?;
                Ok(side)
            }
        }
    }

    /// Which side currently holds the order, if any
    pub fn side_of(&self, order_id: &OrderId) -> Option<Side> {
        if self.bids.contains(order_id) {
            Some(Side::Bid)
        } else if self.asks.contains(order_id) {
            Some(Side::Ask)
        } else {
            None
        }
    }

    pub fn book(&self, side: Side) -> &OrderBook {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn book_mut(&mut self, side: Side) -> &mut OrderBook {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub fn bids(&self) -> &OrderBook {
        &self.bids
    }

    pub fn asks(&self) -> &OrderBook {
        &self.asks
    }
}
