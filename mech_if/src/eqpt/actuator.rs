//! Linear actuator equipment interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared handle to a linear actuator.
pub type ActuatorHandle = Rc<RefCell<dyn LinearActuator>>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single-stroke linear actuator.
///
/// This is the lowest level seam the control core drives. Positions are in
/// metres along the actuator's own axis, velocities in metres per second.
/// Commands are limit-and-velocity based: an absolute move is expressed by
/// setting a travel limit and a signed velocity, and the actuator settles
/// against the limit on its own.
pub trait LinearActuator {
    /// The actuator's configured name.
    fn name(&self) -> String;

    /// Unit vector of the actuator's extension direction in the world frame.
    fn world_direction(&self) -> [f64; 3];

    /// Current extension, in `[lowest_position, highest_position]`.
    fn current_position(&self) -> f64;

    /// Current signed velocity. Positive extends.
    fn velocity(&self) -> f64;

    /// Fully retracted stop.
    fn lowest_position(&self) -> f64;

    /// Fully extended stop.
    fn highest_position(&self) -> f64;

    /// Set the signed velocity demand.
    fn set_velocity(&mut self, vel_ms: f64);

    /// Set the maximum travel limit. Effective for positive velocities.
    fn set_max_limit(&mut self, limit_m: f64);

    /// Set the minimum travel limit. Effective for negative velocities.
    fn set_min_limit(&mut self, limit_m: f64);

    /// Enable or disable actuator power. A disabled actuator holds position.
    fn set_enabled(&mut self, enabled: bool);

    /// True if actuator power is enabled.
    fn is_enabled(&self) -> bool;
}
