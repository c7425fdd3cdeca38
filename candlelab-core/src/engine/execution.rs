//! Execution cost model: slippage and commission folded into a fill price.
//!
//! Slippage is directional: buyers pay more, sellers receive less. Commission
//! is charged on the slipped price and moves the fill further against the
//! trader. Quantity never enters the calculation since the ledger sizes
//! positions from the net fill price.

use crate::domain::Signal;
use thiserror::Error;

pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.0005;

#[derive(Debug, Error, PartialEq)]
pub enum ExecutionError {
    #[error("{name} must be in [0, 1), got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
}

/// Fractional friction applied to every fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionModel {
    commission_rate: f64,
    slippage_rate: f64,
}

impl ExecutionModel {
    pub fn new(commission_rate: f64, slippage_rate: f64) -> Result<Self, ExecutionError> {
        check_rate("commission_rate", commission_rate)?;
        check_rate("slippage_rate", slippage_rate)?;
        Ok(Self {
            commission_rate,
            slippage_rate,
        })
    }

    pub fn frictionless() -> Self {
        Self {
            commission_rate: 0.0,
            slippage_rate: 0.0,
        }
    }

    pub fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    pub fn slippage_rate(&self) -> f64 {
        self.slippage_rate
    }

    /// Net fill price for `signal` at `reference_price`, or `None` for Hold.
    ///
    /// Buy: `p * (1 + slippage) * (1 + commission)`.
    /// Sell: `p * (1 - slippage) * (1 - commission)`.
    pub fn execute(&self, signal: Signal, reference_price: f64) -> Option<f64> {
        match signal {
            Signal::Buy => {
                let fill = reference_price * (1.0 + self.slippage_rate);
                let fee = fill * self.commission_rate;
                Some(fill + fee)
            }
            Signal::Sell => {
                let fill = reference_price * (1.0 - self.slippage_rate);
                let fee = fill * self.commission_rate;
                Some(fill - fee)
            }
            Signal::Hold => None,
        }
    }
}

impl Default for ExecutionModel {
    fn default() -> Self {
        Self {
            commission_rate: DEFAULT_COMMISSION_RATE,
            slippage_rate: DEFAULT_SLIPPAGE_RATE,
        }
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ExecutionError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ExecutionError::RateOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frictionless_returns_reference_price() {
        let model = ExecutionModel::frictionless();
        assert_eq!(model.execute(Signal::Buy, 100.0), Some(100.0));
        assert_eq!(model.execute(Signal::Sell, 100.0), Some(100.0));
    }

    #[test]
    fn hold_produces_no_fill() {
        assert_eq!(ExecutionModel::default().execute(Signal::Hold, 100.0), None);
    }

    #[test]
    fn buy_pays_slippage_then_commission() {
        let model = ExecutionModel::default();
        // 100 * 1.0005 = 100.05; fee 0.10005 → 100.15005
        let fill = model.execute(Signal::Buy, 100.0).unwrap();
        assert!((fill - 100.150_05).abs() < 1e-10, "fill = {fill}");
    }

    #[test]
    fn sell_receives_less() {
        let model = ExecutionModel::default();
        // 100 * 0.9995 = 99.95; fee 0.09995 → 99.85005
        let fill = model.execute(Signal::Sell, 100.0).unwrap();
        assert!((fill - 99.850_05).abs() < 1e-10, "fill = {fill}");
    }

    #[test]
    fn rejects_out_of_range_rates() {
        assert_eq!(
            ExecutionModel::new(1.0, 0.0).unwrap_err(),
            ExecutionError::RateOutOfRange {
                name: "commission_rate",
                value: 1.0
            }
        );
        assert!(ExecutionModel::new(0.0, -0.01).is_err());
        assert!(ExecutionModel::new(f64::NAN, 0.0).is_err());
        assert!(ExecutionModel::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn execution_is_deterministic() {
        let model = ExecutionModel::new(0.002, 0.001).unwrap();
        let a = model.execute(Signal::Buy, 123.45);
        let b = model.execute(Signal::Buy, 123.45);
        assert_eq!(a, b);
    }
}
