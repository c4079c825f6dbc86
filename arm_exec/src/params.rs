//! Parameters structure for the executive

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::crawl::CrawlParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the arm executive.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    // ---- CYCLE ----

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of consecutive cycle overruns tolerated before a warning is
    /// escalated to an error.
    pub max_consec_cycle_overruns: u64,

    // ---- PLANT ----

    /// Name of the arm to assemble, the prefix all its equipment names
    /// carry.
    pub arm_name: String,

    /// Crawl segment tuning.
    pub crawl: CrawlParams,

    // ---- SIM PLANT ----

    /// Per-axis actuator strokes of the demo plant.
    ///
    /// Units: meters
    pub sim_stroke_m: [f64; 3],

    /// Stop threshold of the demo inventory buffer, as a fill ratio.
    pub sim_stop_ratio: f64,

    /// Start threshold of the demo inventory buffer, as a fill ratio.
    pub sim_start_ratio: f64,
}
