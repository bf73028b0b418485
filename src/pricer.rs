//! Target-size pricer
//!
//! Applies each event to the books, re-prices the side it touched and reports
//! the quantities whose value changed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{PricerError, Result};
use crate::orderbook::{BookMetrics, BookPair, Notional, Side};
use crate::parser::Event;

/// Decimal places amounts are quantized to before comparison and emission
pub const AMOUNT_SCALE: u32 = 2;

/// Which tracked quantity an emission refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quantity {
    /// Cost of buying the target size from the asks
    BuyCost,
    /// Proceeds of selling the target size into the bids
    SellProceeds,
}

impl Quantity {
    fn for_side(side: Side) -> Self {
        match side {
            Side::Ask => Quantity::BuyCost,
            Side::Bid => Quantity::SellProceeds,
        }
    }
}

/// Last known value of a tracked quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    /// Nothing has been computed yet
    #[default]
    Unknown,
    Computed(Decimal),
    Insufficient,
}

impl From<Notional> for QuoteState {
    fn from(notional: Notional) -> Self {
        match notional {
            Notional::Filled(amount) => QuoteState::Computed(amount),
            Notional::Insufficient => QuoteState::Insufficient,
        }
    }
}

/// A changed quantity, stamped with the event that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emission {
    pub timestamp: u64,
    pub quantity: Quantity,
    pub value: Notional,
}

/// Tracks buy cost and sell proceeds for a fixed target size
#[derive(Debug)]
pub struct Pricer {
    books: BookPair,
    target_size: u64,
    buy_cost: QuoteState,
    sell_proceeds: QuoteState,
    emit_initial_insufficient: bool,
}

impl Pricer {
    /// Create a pricer for a positive target size
    pub fn new(target_size: u64) -> Result<Self> {
        if target_size == 0 {
            return Err(PricerError::InvalidTargetSize(target_size));
        }
        Ok(Self {
            books: BookPair::new(),
            target_size,
            buy_cost: QuoteState::Unknown,
            sell_proceeds: QuoteState::Unknown,
            emit_initial_insufficient: false,
        })
    }

    /// Also emit the first insufficient outcome of a quantity that was never computed
    pub fn with_initial_insufficient(mut self, emit: bool) -> Self {
        self.emit_initial_insufficient = emit;
        self
    }

    /// Apply one event and return the emissions it produced
    ///
    /// Protocol violations leave the books untouched and are returned as errors.
    /// A notional too large for `Decimal` is also an error; the event stays applied
    /// and the tracked quantity keeps its previous state.
    /// Amounts are compared at [`AMOUNT_SCALE`] decimals, so moves smaller than
    /// a cent are not re-emitted.
    pub fn process(&mut self, event: &Event) -> Result<Vec<Emission>> {
        let side = self.books.apply(event)?;
        trace!(book = %self.books.book(side), "Book updated");

        // Only the touched side can change its outcome.
        let quantity = Quantity::for_side(side);
        let notional = self
            .books
            .book(side)
            .walk_for_size(self.target_size)?
            .round_dp(AMOUNT_SCALE);
        let next = QuoteState::from(notional);

        let emit_initial_insufficient = self.emit_initial_insufficient;
        let state = self.state_mut(quantity);
        let previous = std::mem::replace(state, next);

        let emit = match (previous, next) {
            (QuoteState::Unknown, QuoteState::Insufficient) => emit_initial_insufficient,
            (previous, next) => previous != next,
        };

        debug!(
            timestamp = event.timestamp,
            order_id = %event.order_id,
            side = %side,
            ?previous,
            ?next,
            emit,
            "Event applied"
        );

        if !emit {
            return Ok(Vec::new());
        }

        Ok(vec![Emission {
            timestamp: event.timestamp,
            quantity,
            value: notional,
        }])
    }

    fn state_mut(&mut self, quantity: Quantity) -> &mut QuoteState {
        match quantity {
            Quantity::BuyCost => &mut self.buy_cost,
            Quantity::SellProceeds => &mut self.sell_proceeds,
        }
    }

    pub fn target_size(&self) -> u64 {
        self.target_size
    }

    pub fn books(&self) -> &BookPair {
        &self.books
    }

    pub fn buy_cost(&self) -> QuoteState {
        self.buy_cost
    }

    pub fn sell_proceeds(&self) -> QuoteState {
        self.sell_proceeds
    }

    /// Summary of the current book state
    pub fn metrics(&self) -> BookMetrics {
        BookMetrics::from_books(&self.books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn emission(timestamp: u64, quantity: Quantity, value: Notional) -> Emission {
        Emission { timestamp, quantity, value }
    }

    #[test]
    fn test_zero_target_rejected() {
        assert!(matches!(Pricer::new(0), Err(PricerError::InvalidTargetSize(0))));
    }

    #[test]
    fn test_cost_then_insufficient_after_elimination() {
        let mut pricer = Pricer::new(120).unwrap();

        let out = pricer.process(&Event::add(1, "1", Side::Ask, dec!(10), 100)).unwrap();
        assert!(out.is_empty());
        assert_eq!(pricer.buy_cost(), QuoteState::Insufficient);

        let out = pricer.process(&Event::add(2, "2", Side::Ask, dec!(9), 50)).unwrap();
        assert_eq!(out, vec![emission(2, Quantity::BuyCost, Notional::Filled(dec!(1150)))]);

        let out = pricer.process(&Event::reduce(3, "2", 50)).unwrap();
        assert_eq!(out, vec![emission(3, Quantity::BuyCost, Notional::Insufficient)]);
        assert_eq!(pricer.buy_cost(), QuoteState::Insufficient);
    }

    #[test]
    fn test_unchanged_value_not_reemitted() {
        let mut pricer = Pricer::new(100).unwrap();
        pricer.process(&Event::add(1, "a", Side::Bid, dec!(20), 100)).unwrap();
        pricer.process(&Event::add(2, "far", Side::Bid, dec!(5), 100)).unwrap();

        // Deep level far from the boundary does not move the proceeds
        let out = pricer.process(&Event::reduce(3, "far", 40)).unwrap();
        assert!(out.is_empty());
        assert_eq!(pricer.sell_proceeds(), QuoteState::Computed(dec!(2000)));
    }

    #[test]
    fn test_bid_events_never_touch_buy_cost() {
        let mut pricer = Pricer::new(10).unwrap();
        pricer.process(&Event::add(1, "ask", Side::Ask, dec!(50), 10)).unwrap();
        let cost = pricer.buy_cost();

        for (ts, event) in [
            Event::add(2, "b1", Side::Bid, dec!(49), 5),
            Event::add(3, "b2", Side::Bid, dec!(48), 20),
            Event::reduce(4, "b2", 20),
        ]
        .iter()
        .enumerate()
        {
            let out = pricer.process(event).unwrap();
            assert!(out.iter().all(|e| e.quantity == Quantity::SellProceeds), "event {}", ts);
            assert_eq!(pricer.buy_cost(), cost);
        }
    }

    #[test]
    fn test_recovery_from_insufficient() {
        let mut pricer = Pricer::new(10).unwrap();
        pricer.process(&Event::add(1, "a", Side::Bid, dec!(5), 10)).unwrap();
        pricer.process(&Event::reduce(2, "a", 1)).unwrap();

        let out = pricer.process(&Event::add(3, "b", Side::Bid, dec!(4), 1)).unwrap();
        assert_eq!(out, vec![emission(3, Quantity::SellProceeds, Notional::Filled(dec!(49)))]);
    }

    #[test]
    fn test_initial_insufficient_policy() {
        let mut silent = Pricer::new(10).unwrap();
        assert!(silent
            .process(&Event::add(1, "a", Side::Ask, dec!(5), 1))
            .unwrap()
            .is_empty());

        let mut loud = Pricer::new(10).unwrap().with_initial_insufficient(true);
        let out = loud.process(&Event::add(1, "a", Side::Ask, dec!(5), 1)).unwrap();
        assert_eq!(out, vec![emission(1, Quantity::BuyCost, Notional::Insufficient)]);

        // Only the first transition out of Unknown is affected
        assert!(loud
            .process(&Event::add(2, "b", Side::Ask, dec!(5), 1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_sub_cent_moves_not_reemitted() {
        let mut pricer = Pricer::new(1).unwrap();

        let out = pricer.process(&Event::add(1, "a", Side::Ask, dec!(10.001), 1)).unwrap();
        assert_eq!(out, vec![emission(1, Quantity::BuyCost, Notional::Filled(dec!(10.00)))]);

        pricer.process(&Event::add(2, "b", Side::Ask, dec!(10.004), 1)).unwrap();
        // Best ask moves from 10.001 to 10.004, both 10.00 at cent precision
        assert!(pricer.process(&Event::reduce(3, "a", 1)).unwrap().is_empty());

        // 9.995 rounds half away from zero to 10.00
        assert!(pricer
            .process(&Event::add(4, "c", Side::Ask, dec!(9.995), 1))
            .unwrap()
            .is_empty());
        assert_eq!(pricer.buy_cost(), QuoteState::Computed(dec!(10.00)));

        let out = pricer.process(&Event::add(5, "d", Side::Ask, dec!(9.994), 1)).unwrap();
        assert_eq!(out, vec![emission(5, Quantity::BuyCost, Notional::Filled(dec!(9.99)))]);
    }

    #[test]
    fn test_overflowing_notional_is_an_error() {
        let mut pricer = Pricer::new(2).unwrap();
        let event: Event = "1 A a S 79228162514264337593543950335 2".parse().unwrap();

        assert!(matches!(
            pricer.process(&event),
            Err(PricerError::NotionalOverflow { side: Side::Ask, target_size: 2 })
        ));
        assert_eq!(pricer.buy_cost(), QuoteState::Unknown);
    }

    #[test]
    fn test_protocol_violation_leaves_state() {
        let mut pricer = Pricer::new(10).unwrap();
        pricer.process(&Event::add(1, "a", Side::Ask, dec!(5), 10)).unwrap();

        let err = pricer
            .process(&Event::add(2, "a", Side::Bid, dec!(4), 10))
            .unwrap_err();
        assert!(err.is_protocol_violation());
        assert!(pricer.books().bids().is_empty());
        assert_eq!(pricer.buy_cost(), QuoteState::Computed(dec!(50)));

        assert!(matches!(
            pricer.process(&Event::reduce(3, "nope", 1)),
            Err(PricerError::UnknownOrder(_))
        ));
    }

    #[test]
    fn test_metrics_reflect_books() {
        let mut pricer = Pricer::new(10).unwrap();
        pricer.process(&Event::add(1, "a", Side::Ask, dec!(5), 10)).unwrap();
        assert_eq!(pricer.metrics().ask_depth, 10);
        assert_eq!(pricer.target_size(), 10);
    }
}
