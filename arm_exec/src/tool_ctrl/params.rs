//! Parameters structure for ToolCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for tool control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    // ---- RASTER ----

    /// Raster cell pitch per axis.
    ///
    /// Units: meters
    pub step_m: [f64; 3],

    /// Base sweep speed, from which the per-axis raster speeds are derived.
    ///
    /// Units: meters/second
    pub sweep_speed_ms: f64,
}
