//! Tool control module
//!
//! The cyclic module that drives the whole rig: it owns the arm and the
//! tool head, pulls targets from the raster planner, and gates all motion
//! and tool power on feed-stock level and structural health.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::{InitData, InputData, OutputData, StatusReport, ToolCtrl};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ToolCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum ToolCtrlInitError {
    #[error("Could not initialise an archiver: {0}")]
    ArchiveInitError(String),
}

/// Possible errors that can occur during ToolCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ToolCtrlError {
    #[error("ToolCtrl has not been initialised")]
    NotInitialised,

    #[error("Motion command refused: {0}")]
    MotionError(#[from] crate::motion::MotionError),
}
