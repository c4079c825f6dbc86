//! Motion primitives
//!
//! Everything that can report a position and be commanded to move implements
//! [`Positionable`]: the raw actuator, the lockstep group, the polarity
//! decorator, the telescoping chain and the crawl segment. Composites own
//! their constituents as boxed trait objects; the concrete kind set is fixed
//! at arm-build time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod actuator;
mod axis_chain;
mod group;
mod reversed;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use actuator::Actuator;
pub use axis_chain::AxisChain;
pub use group::ActuatorGroup;
pub use reversed::Reversed;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance below which two positions are considered equal.
pub const POS_EPS_M: f64 = 1e-3;

/// A group member lagging more than this behind the group leader gets a
/// correcting move issued by `sync`.
pub const SYNC_TOL_M: f64 = 0.1;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur when commanding motion primitives.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error(
        "Grouped actuators must share stroke length: \"{name}\" has \
         {stroke_m} m but the group has {group_stroke_m} m"
    )]
    MismatchedStroke {
        name: String,
        stroke_m: f64,
        group_stroke_m: f64,
    },

    #[error(
        "Negative-direction motion is not supported by crawl segment \
         \"{name}\": at {pos_m:.3} m, commanded {target_m:.3} m"
    )]
    CrawlRetractUnsupported {
        name: String,
        pos_m: f64,
        target_m: f64,
    },

    #[error("An actuator group must have at least one member")]
    EmptyGroup,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Capability set shared by all motion primitives.
///
/// Positions are local to the element's own axis and always lie in
/// `[0, max]` once refreshed. `max` is fixed at construction and never
/// mutates.
pub trait Positionable {
    /// Re-read physical state. Must be called once per tick, before any
    /// decision is made from `pos`. `dt_s` is the measured elapsed time
    /// since the previous tick, consumed by elements with internal
    /// countdowns.
    fn refresh(&mut self, dt_s: f64);

    /// Current position along this element's local axis.
    fn pos(&self) -> f64;

    /// The element's total stroke.
    fn max(&self) -> f64;

    /// Current signed speed. Positive increases `pos`.
    fn speed(&self) -> f64;

    /// Command an absolute-position move at the given (unsigned) speed.
    fn move_to(&mut self, pos_m: f64, speed_ms: f64) -> Result<(), MotionError>;

    /// Set the signed velocity demand without changing travel limits.
    fn set_speed(&mut self, speed_ms: f64);

    /// Enable element power.
    fn start(&mut self);

    /// Disable element power.
    fn stop(&mut self);

    /// Returns true if the element is within tolerance of its reference.
    /// A composite issues correcting moves to out-of-tolerance constituents
    /// and keeps returning false until they converge.
    fn sync(&mut self) -> bool;

    /// True when the element is quiescent and its reported position can be
    /// trusted for safety-relevant decisions. A crawl segment is not stable
    /// while relocating its anchor.
    fn is_stable(&self) -> bool;
}
