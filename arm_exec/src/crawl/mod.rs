//! Crawl segment
//!
//! A crawl segment gives one axis effectively unbounded travel from a short
//! physical slider: when the slider runs out of stroke the segment walks its
//! anchor point forward past the stroke limit, inchworm fashion, then
//! resumes normal translation. The walk is a closed sixteen-state protocol
//! driven one step per control tick by physical confirmation signals.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod segment;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use segment::CrawlSegment;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// State of the relocation protocol.
///
/// `TranslatingLoad` is the only steady state: the trailing anchor is locked
/// and slider extension translates the load directly. Every other state is
/// one step of the anchor walk, in the order listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Trailing anchor locked, slider extension moves the load.
    TranslatingLoad,

    /// Driving the slider to its top stop with the leading merge enabled.
    MergeTopSlideUp,

    /// Backing off the top stop until the leading merge connects.
    MergeTopSlideDown,

    /// Seating the leading connector at the top stop.
    BigSyncTopConnector,

    /// Waiting for the leading connector to confirm locked.
    BigLockingTopConnector,

    /// Releasing the trailing anchor.
    UnlockingBottom,

    /// Retracting the slider, dragging the trailing structure forward.
    TranslatingSlider,

    /// Fixed dwell for the cutting head to clear the bridged joint.
    Grind,

    /// Driving the slider to its bottom stop with the trailing merge enabled.
    MergeBottomSlideDown,

    /// Backing off the bottom stop until the trailing merge connects.
    MergeBottomSlideUp,

    /// Waiting for the trailing connector to confirm locked.
    LockingBottomConnector,

    /// Releasing the leading connector from its top seat.
    RewindTopConnector,

    /// Seating the leading connector at the bottom stop.
    SmallSyncTopConnector,

    /// Waiting for the leading connector to confirm locked at the bottom.
    SmallLockingTopConnector,

    /// Dropping both merge bridges.
    UnlockingBottomMergeBlock,

    /// Settling the slider on its bottom stop before committing the new
    /// base offset and resuming load translation.
    RewindLoad,
}

impl std::fmt::Display for CrawlState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Possible errors when building a crawl segment.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(
        "Cannot determine a starting state for crawl segment \"{name}\": \
         neither anchor connector is locked. The carriage must be manually \
         re-anchored before the arm can be built."
    )]
    NoAnchorLocked { name: String },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Crawl segment tuning parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlParams {
    /// Total travel the segment reports as its stroke.
    pub travel_m: f64,

    /// Slider speed while seating connectors and merges.
    pub approach_speed_ms: f64,

    /// Slider speed while dragging the trailing structure forward.
    pub shuttle_speed_ms: f64,

    /// Dwell time in the `Grind` state.
    pub grind_duration_s: f64,

    /// Distance from a slider stop within which a connector seat is
    /// reachable.
    pub lock_window_m: f64,

    /// Positioning tolerance used to decide a slider move has settled.
    /// Must be smaller than `lock_window_m`.
    pub settle_m: f64,
}
