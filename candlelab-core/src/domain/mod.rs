//! Domain types for CandleLab

pub mod candle;
pub mod position;
pub mod signal;
pub mod trade;

pub use candle::Candle;
pub use position::{OpenPosition, PositionState};
pub use signal::Signal;
pub use trade::{ClosedTrade, ExitReason};
