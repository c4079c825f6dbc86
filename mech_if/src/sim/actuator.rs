//! Simulated linear actuator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use crate::eqpt::actuator::LinearActuator;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated single-stroke linear actuator.
///
/// Integrates its commanded velocity against its commanded travel limits on
/// each `step` call. A disabled actuator holds position.
pub struct SimActuator {
    name: String,
    world_dir: [f64; 3],
    lowest: f64,
    highest: f64,
    pos: f64,
    vel: f64,
    min_limit: f64,
    max_limit: f64,
    enabled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimActuator {
    /// Create a new actuator with the given stroke, fully retracted.
    pub fn new(name: &str, stroke_m: f64, world_dir: [f64; 3]) -> Self {
        Self {
            name: name.to_string(),
            world_dir,
            lowest: 0.0,
            highest: stroke_m,
            pos: 0.0,
            vel: 0.0,
            min_limit: 0.0,
            max_limit: stroke_m,
            enabled: false,
        }
    }

    /// Wrap this actuator in a shared handle.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Advance the simulated physics by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        if !self.enabled {
            return;
        }

        let next = self.pos + self.vel * dt_s;

        // The actuator settles against whichever limit is effective for its
        // direction of travel.
        if self.vel > 0.0 {
            self.pos = next.min(self.max_limit.min(self.highest));
        } else if self.vel < 0.0 {
            self.pos = next.max(self.min_limit.max(self.lowest));
        }
    }

    /// Force the position, for test setup only.
    pub fn force_position(&mut self, pos_m: f64) {
        self.pos = pos_m.max(self.lowest).min(self.highest);
    }
}

impl LinearActuator for SimActuator {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn world_direction(&self) -> [f64; 3] {
        self.world_dir
    }

    fn current_position(&self) -> f64 {
        self.pos
    }

    fn velocity(&self) -> f64 {
        self.vel
    }

    fn lowest_position(&self) -> f64 {
        self.lowest
    }

    fn highest_position(&self) -> f64 {
        self.highest
    }

    fn set_velocity(&mut self, vel_ms: f64) {
        self.vel = vel_ms;
    }

    fn set_max_limit(&mut self, limit_m: f64) {
        self.max_limit = limit_m.min(self.highest);
    }

    fn set_min_limit(&mut self, limit_m: f64) {
        self.min_limit = limit_m.max(self.lowest);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_settles_against_limit() {
        let mut act = SimActuator::new("Rig 0 X+", 10.0, [1.0, 0.0, 0.0]);
        act.set_enabled(true);
        act.set_max_limit(4.0);
        act.set_velocity(1.0);

        for _ in 0..6 {
            act.step(1.0);
        }

        // Settled on the limit, not the full stroke
        assert!((act.current_position() - 4.0).abs() < 1e-9);

        // Retraction honours the min limit
        act.set_min_limit(2.5);
        act.set_velocity(-1.0);
        for _ in 0..6 {
            act.step(1.0);
        }
        assert!((act.current_position() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_holds_position() {
        let mut act = SimActuator::new("Rig 0 Y+", 10.0, [0.0, 1.0, 0.0]);
        act.set_enabled(true);
        act.set_velocity(1.0);
        act.step(1.0);
        assert!((act.current_position() - 1.0).abs() < 1e-9);

        act.set_enabled(false);
        act.step(5.0);
        assert!((act.current_position() - 1.0).abs() < 1e-9);
    }
}
