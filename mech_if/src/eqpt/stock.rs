//! Feed-stock / inventory buffer interface
//!
//! The inventory collaborator owns the threshold ladder; the control core
//! only consumes the resulting tri-state classification. The `Stop` and
//! `Start` thresholds are distinct so that gating has hysteresis: a fill
//! ratio oscillating at one boundary cannot chatter the tool on and off.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Classification of the current feed-stock level against the configured
/// threshold ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    /// Beyond the stop threshold: motion and tool power must halt.
    Stop,

    /// Between the thresholds: an already-running tool may continue, an idle
    /// one must stay idle.
    Continue,

    /// Strictly clear of the start threshold: an idle tool may start.
    Start,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of the inventory buffer state, taken at most once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockState {
    /// Overall tri-state classification.
    pub level: StockLevel,

    /// Item kinds currently at or below the queried threshold, for status
    /// display (e.g. which feed material ran out).
    pub deficient: Vec<String>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Read-only query of the inventory buffer collaborator.
pub trait StockMonitor {
    /// Classify the current accumulated quantities against the threshold
    /// ladder. Idempotent within a tick.
    fn state(&self) -> StockState;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StockState {
    fn default() -> Self {
        Self {
            level: StockLevel::Start,
            deficient: Vec::new(),
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockLevel::Stop => write!(f, "STOP"),
            StockLevel::Continue => write!(f, "CONTINUE"),
            StockLevel::Start => write!(f, "START"),
        }
    }
}
