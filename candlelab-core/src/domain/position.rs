use serde::{Deserialize, Serialize};

/// Two-state position flag shared by the ledger and strategies.
///
/// Long-only: there is no short state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long)
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

/// An open long position held by the ledger.
///
/// Entry and stop prices only exist while a position is open, so the
/// `quantity > 0 ⇔ Long ⇔ entry set ⇔ stop set` invariant is carried by
/// `Option<OpenPosition>` on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub quantity: f64,
    pub entry_price: f64,
    pub stop_price: f64,
}

impl OpenPosition {
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity * (current_price - self.entry_price)
    }

    /// Whether `price` has reached the stop level.
    pub fn is_stopped_out(&self, price: f64) -> bool {
        price <= self.stop_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_flat() {
        assert_eq!(PositionState::default(), PositionState::Flat);
        assert!(PositionState::Long.is_long());
    }

    #[test]
    fn unrealized_pnl_tracks_price() {
        let pos = OpenPosition {
            quantity: 10.0,
            entry_price: 100.0,
            stop_price: 98.0,
        };
        assert_eq!(pos.unrealized_pnl(110.0), 100.0);
        assert_eq!(pos.unrealized_pnl(95.0), -50.0);
    }

    #[test]
    fn stop_is_inclusive() {
        let pos = OpenPosition {
            quantity: 1.0,
            entry_price: 100.0,
            stop_price: 98.0,
        };
        assert!(pos.is_stopped_out(98.0));
        assert!(pos.is_stopped_out(97.5));
        assert!(!pos.is_stopped_out(98.01));
    }
}
