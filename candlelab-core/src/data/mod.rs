//! Candle supply: the sequential source the simulation loop pulls from, file
//! ingestion, and synthetic data for development.

pub mod ingest;
pub mod synthetic;

pub use ingest::{dataset_hash, load_candles, parse_timestamp, IngestError};
pub use synthetic::synthetic_candles;

use crate::domain::Candle;

/// Sequential, exhaustible supply of candles.
///
/// Exhaustion is the normal end of a run, not an error.
pub trait CandleSource {
    fn has_next(&self) -> bool;

    /// Next candle in time order, or `None` once exhausted.
    fn next_candle(&mut self) -> Option<Candle>;

    /// Candles left to deliver, when known up front.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }
}

/// In-memory source over a borrowed candle slice.
#[derive(Debug, Clone)]
pub struct CandleFeed<'a> {
    candles: &'a [Candle],
    index: usize,
}

impl<'a> CandleFeed<'a> {
    pub fn new(candles: &'a [Candle]) -> Self {
        Self { candles, index: 0 }
    }

}

impl CandleSource for CandleFeed<'_> {
    fn has_next(&self) -> bool {
        self.index < self.candles.len()
    }

    fn next_candle(&mut self) -> Option<Candle> {
        let candle = self.candles.get(self.index).copied()?;
        self.index += 1;
        Some(candle)
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.candles.len() - self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_delivers_in_order_then_exhausts() {
        let candles = synthetic_candles(3, 7);
        let mut feed = CandleFeed::new(&candles);
        assert_eq!(feed.remaining_hint(), Some(3));

        let mut seen = Vec::new();
        while feed.has_next() {
            seen.push(feed.next_candle().unwrap());
        }
        assert_eq!(seen, candles);
        assert_eq!(feed.next_candle(), None);
        assert_eq!(feed.remaining_hint(), Some(0));
    }

    #[test]
    fn empty_feed_has_nothing() {
        let mut feed = CandleFeed::new(&[]);
        assert_eq!(feed.remaining_hint(), Some(0));
        assert!(!feed.has_next());
        assert_eq!(feed.next_candle(), None);
    }
}
