//! Moving-average crossover with trend, volatility and momentum filters.
//!
//! Entry requires all of:
//! - a strict bullish crossover of the short SMA over the long SMA,
//! - a full trend stack: short SMA > long SMA > long-period EMA,
//! - the EMA rising against its tenth-most-recent sample,
//! - ATR above 0.8× its trailing 20-sample mean (no dead markets),
//! - RSI strictly between 50 and 75 (momentum without exhaustion),
//! - being flat.
//!
//! On entry the strategy proposes a volatility-scaled stop at
//! `close - 2.5 × ATR`. Exit fires when the long SMA rises back above the short
//! SMA while long. Stop-loss exits are enforced by the ledger, not here.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PositionSync, StopLossHint, Strategy, StrategyError};
use crate::domain::{Candle, PositionState, Signal};
use crate::indicators::{Atr, Ema, Indicator, RollingWindow, Rsi, Sma};

/// Samples between the current EMA and the one it must exceed.
const EMA_SLOPE_LOOKBACK: usize = 10;
/// Trailing ATR samples averaged for the volatility gate.
const ATR_AVERAGE_WINDOW: usize = 20;
const VOLATILITY_FACTOR: f64 = 0.8;
const RSI_LOWER: f64 = 50.0;
const RSI_UPPER: f64 = 75.0;
const STOP_ATR_MULTIPLE: f64 = 2.5;

/// Parameters for [`MaCrossover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaCrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
    #[serde(default = "default_ema_period")]
    pub ema_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
}

fn default_ema_period() -> usize {
    200
}

fn default_atr_period() -> usize {
    14
}

fn default_rsi_period() -> usize {
    14
}

impl Default for MaCrossoverParams {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            ema_period: default_ema_period(),
            atr_period: default_atr_period(),
            rsi_period: default_rsi_period(),
        }
    }
}

impl MaCrossoverParams {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        let windows = [
            ("short_window", self.short_window),
            ("long_window", self.long_window),
            ("ema_period", self.ema_period),
            ("atr_period", self.atr_period),
            ("rsi_period", self.rsi_period),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(StrategyError::NonPositiveWindow { name });
            }
        }
        if self.short_window >= self.long_window {
            return Err(StrategyError::WindowOrder {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }

    /// Candles consumed before the first non-Hold signal.
    pub fn warmup(&self) -> usize {
        self.long_window + self.atr_period
    }

    /// Identifier used to tag results, e.g. `ma_20_50`.
    pub fn strategy_id(&self) -> String {
        format!("ma_{}_{}", self.short_window, self.long_window)
    }
}

/// Reference moving-average crossover strategy.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    params: MaCrossoverParams,
    name: String,
    candles_seen: usize,
    short_sma: Sma,
    long_sma: Sma,
    ema: Ema,
    ema_history: RollingWindow,
    atr: Atr,
    atr_history: RollingWindow,
    rsi: Rsi,
    prev_short: Option<f64>,
    prev_long: Option<f64>,
    position: PositionState,
    stop_price: Option<f64>,
}

impl MaCrossover {
    pub fn new(params: MaCrossoverParams) -> Result<Self, StrategyError> {
        params.validate()?;
        Ok(Self {
            params,
            name: params.strategy_id(),
            candles_seen: 0,
            short_sma: Sma::new(params.short_window),
            long_sma: Sma::new(params.long_window),
            ema: Ema::new(params.ema_period),
            ema_history: RollingWindow::new(EMA_SLOPE_LOOKBACK),
            atr: Atr::new(params.atr_period),
            atr_history: RollingWindow::new(ATR_AVERAGE_WINDOW),
            rsi: Rsi::new(params.rsi_period),
            prev_short: None,
            prev_long: None,
            position: PositionState::Flat,
            stop_price: None,
        })
    }

    /// Stop proposed for the current position, if long.
    pub fn stop_price(&self) -> Option<f64> {
        self.stop_price
    }

    fn ema_rising(&self, ema: f64) -> bool {
        if self.candles_seen <= EMA_SLOPE_LOOKBACK {
            return false;
        }
        match self.ema_history.back(EMA_SLOPE_LOOKBACK - 1) {
            Some(reference) => ema > reference,
            None => false,
        }
    }

    /// The trailing sum is always divided by the full window length, so the
    /// average is damped until 20 ATR samples exist.
    fn volatile_enough(&self, atr: f64) -> bool {
        let avg = self.atr_history.sum() / ATR_AVERAGE_WINDOW as f64;
        atr > VOLATILITY_FACTOR * avg
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_candle(&mut self, candle: &Candle) -> Signal {
        self.candles_seen += 1;

        let ema = self.ema.update(candle);
        self.ema_history.push(ema);
        let atr = self.atr.update(candle);
        self.atr_history.push(atr);
        self.short_sma.update(candle);
        self.long_sma.update(candle);
        let rsi = self.rsi.update(candle);

        if self.candles_seen < self.params.warmup() {
            return Signal::Hold;
        }

        let (Some(short), Some(long)) = (self.short_sma.value(), self.long_sma.value()) else {
            return Signal::Hold;
        };

        let cross_up = match (self.prev_short, self.prev_long) {
            (Some(ps), Some(pl)) => ps <= pl && short > long,
            _ => false,
        };
        self.prev_short = Some(short);
        self.prev_long = Some(long);

        let trend_stack = short > long && long > ema;
        let bullish_momentum = rsi > RSI_LOWER && rsi < RSI_UPPER;

        if cross_up
            && trend_stack
            && self.ema_rising(ema)
            && self.volatile_enough(atr)
            && bullish_momentum
            && self.position.is_flat()
        {
            let stop = candle.close - STOP_ATR_MULTIPLE * atr;
            debug!(
                strategy = %self.name,
                close = candle.close,
                short, long, ema, atr, rsi, stop,
                "entry signal"
            );
            self.stop_price = Some(stop);
            self.position = PositionState::Long;
            return Signal::Buy;
        }

        if long > short && self.position.is_long() {
            debug!(strategy = %self.name, close = candle.close, short, long, "trend stack broke");
            self.position = PositionState::Flat;
            self.stop_price = None;
            return Signal::Sell;
        }

        Signal::Hold
    }

    fn position(&self) -> PositionState {
        self.position
    }

    fn set_position(&mut self, state: PositionState) {
        self.position = state;
    }

    fn stop_loss(&self) -> Option<&dyn StopLossHint> {
        Some(self)
    }

    fn position_sync(&mut self) -> Option<&mut dyn PositionSync> {
        Some(self)
    }

    fn warmup(&self) -> usize {
        self.params.warmup()
    }
}

impl StopLossHint for MaCrossover {
    fn stop_loss_price(&self) -> Option<f64> {
        self.stop_price
    }
}

impl PositionSync for MaCrossover {
    fn sync_position(&mut self, state: PositionState) {
        self.position = state;
        if state.is_flat() {
            self.stop_price = None;
        }
    }
}
