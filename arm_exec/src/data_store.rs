//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use mech_if::eqpt::{StockState, StructuralReport};

use crate::tool_ctrl;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Gives the reason the rig has been put into safe mode.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    /// The raster fill visited every cell.
    FillComplete,

    /// Tool control raised a processing error.
    ToolCtrlError,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the rig is in safe mode.
    pub safe: bool,

    /// Gives the reason for the rig being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Collaborator snapshots, taken once per cycle
    pub stock_state: StockState,
    pub structural_report: StructuralReport,

    // ToolCtrl
    pub tool_ctrl: tool_ctrl::ToolCtrl,
    pub tool_ctrl_input: tool_ctrl::InputData,
    pub tool_ctrl_output: tool_ctrl::OutputData,
    pub tool_ctrl_status_rpt: tool_ctrl::StatusReport,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Put the rig into safe mode.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            log::warn!("Rig entering safe mode: {:?}", cause);
        }
        self.safe = true;
        self.safe_cause = Some(cause);
    }
}
