//! Strategy interface — per-candle decision making with declared capabilities.
//!
//! A strategy is stateful across calls: it folds each candle into its own
//! indicators and decides Buy/Sell/Hold. It also keeps its own belief about
//! whether it is in a position, which it uses only to decide re-entry
//! eligibility. The ledger is the source of truth for capital deployment, so
//! the simulation loop overwrites that belief whenever the ledger force-closes
//! a position.
//!
//! Two optional capabilities are declared through accessor methods rather than
//! probed at runtime:
//!
//! | Capability      | When not declared                                   |
//! |-----------------|-----------------------------------------------------|
//! | `StopLossHint`  | the ledger applies its default stop fraction        |
//! | `PositionSync`  | the loop overwrites the flag through `set_position` |

pub mod buy_and_hold;
pub mod ma_crossover;

pub use buy_and_hold::BuyAndHold;
pub use ma_crossover::{MaCrossover, MaCrossoverParams};

use crate::domain::{Candle, PositionState, Signal};
use thiserror::Error;

/// Errors from strategy construction.
#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    #[error("{name} must be positive")]
    NonPositiveWindow { name: &'static str },

    #[error("short_window ({short}) must be less than long_window ({long})")]
    WindowOrder { short: usize, long: usize },
}

/// Custom stop price communicated to the ledger at entry time.
pub trait StopLossHint {
    /// Stop level for the position being opened, or `None` to fall back to the
    /// ledger's default stop fraction.
    fn stop_loss_price(&self) -> Option<f64>;
}

/// External reconciliation hook for the strategy's position belief.
pub trait PositionSync {
    /// Force the strategy into `state`, clearing any state tied to the old
    /// position (e.g. a pending stop level).
    fn sync_position(&mut self, state: PositionState);
}

/// Stateful per-candle decision function.
pub trait Strategy: Send {
    /// Strategy identifier for logging.
    fn name(&self) -> &str;

    /// Fold in the next candle and decide.
    fn on_candle(&mut self, candle: &Candle) -> Signal;

    /// The strategy's own belief about its position.
    fn position(&self) -> PositionState;

    /// Overwrite the position belief directly. This is the fallback the loop
    /// uses when `position_sync()` is not declared.
    fn set_position(&mut self, state: PositionState);

    /// Declared custom-stop capability. Default: none.
    fn stop_loss(&self) -> Option<&dyn StopLossHint> {
        None
    }

    /// Declared position-sync capability. Default: none.
    fn position_sync(&mut self) -> Option<&mut dyn PositionSync> {
        None
    }

    /// Number of candles consumed before the first non-Hold signal is possible.
    fn warmup(&self) -> usize {
        0
    }
}

/// Custom stop price from the strategy, if it declares the capability.
pub fn stop_hint(strategy: &dyn Strategy) -> Option<f64> {
    strategy.stop_loss().and_then(|hint| hint.stop_loss_price())
}

/// Force the strategy's position belief to `state` using its declared sync
/// capability, or the direct flag overwrite when it has none.
pub fn force_position(strategy: &mut dyn Strategy, state: PositionState) {
    match strategy.position_sync() {
        Some(sync) => sync.sync_position(state),
        None => strategy.set_position(state),
    }
}
