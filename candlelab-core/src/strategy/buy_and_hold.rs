//! Buy-and-hold baseline.
//!
//! Enters whenever it believes it is flat and never exits on its own. It
//! declares no capabilities, so the ledger's default stop fraction applies and
//! a stop-out reaches it as a plain `set_position(Flat)`, after which it buys
//! again on the next candle.

use super::Strategy;
use crate::domain::{Candle, PositionState, Signal};

#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    position: PositionState,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn on_candle(&mut self, _candle: &Candle) -> Signal {
        if self.position.is_flat() {
            self.position = PositionState::Long;
            Signal::Buy
        } else {
            Signal::Hold
        }
    }

    fn position(&self) -> PositionState {
        self.position
    }

    fn set_position(&mut self, state: PositionState) {
        self.position = state;
    }
}
