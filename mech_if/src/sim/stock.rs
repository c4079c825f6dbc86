//! Simulated inventory buffer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use crate::eqpt::stock::{StockLevel, StockMonitor, StockState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated inventory buffer classifying a downstream fill ratio against
/// a two-threshold ladder.
///
/// `stop_ratio` must be strictly greater than `start_ratio`: the gap between
/// the two is what gives the gating its hysteresis.
pub struct SimStock {
    fill_ratio: f64,
    stop_ratio: f64,
    start_ratio: f64,
    deficient: Vec<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimStock {
    pub fn new(stop_ratio: f64, start_ratio: f64) -> Self {
        assert!(
            stop_ratio > start_ratio,
            "stop/start thresholds must be distinct for hysteresis"
        );
        Self {
            fill_ratio: 0.0,
            stop_ratio,
            start_ratio,
            deficient: Vec::new(),
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Rig input: current downstream fill ratio in `[0, 1]`.
    pub fn set_fill_ratio(&mut self, ratio: f64) {
        self.fill_ratio = ratio;
    }

    /// Rig input: item kinds currently missing from the feed.
    pub fn set_deficient(&mut self, kinds: Vec<String>) {
        self.deficient = kinds;
    }
}

impl StockMonitor for SimStock {
    fn state(&self) -> StockState {
        // A missing feed kind forces a stop regardless of fill level.
        let level = if !self.deficient.is_empty() || self.fill_ratio > self.stop_ratio {
            StockLevel::Stop
        } else if self.fill_ratio > self.start_ratio {
            StockLevel::Continue
        } else {
            StockLevel::Start
        };

        StockState {
            level,
            deficient: self.deficient.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_threshold_ladder() {
        let mut stock = SimStock::new(0.6, 0.4);

        stock.set_fill_ratio(0.2);
        assert_eq!(stock.state().level, StockLevel::Start);

        stock.set_fill_ratio(0.5);
        assert_eq!(stock.state().level, StockLevel::Continue);

        stock.set_fill_ratio(0.7);
        assert_eq!(stock.state().level, StockLevel::Stop);
    }

    #[test]
    fn test_missing_kind_forces_stop() {
        let mut stock = SimStock::new(0.6, 0.4);
        stock.set_fill_ratio(0.0);
        stock.set_deficient(vec!["SteelPlate".into()]);

        let state = stock.state();
        assert_eq!(state.level, StockLevel::Stop);
        assert_eq!(state.deficient, vec!["SteelPlate".to_string()]);
    }
}
