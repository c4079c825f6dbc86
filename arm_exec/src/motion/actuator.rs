//! Single-stroke actuator primitive

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use mech_if::eqpt::ActuatorHandle;

// Internal
use super::{MotionError, Positionable, POS_EPS_M};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wraps one physical linear actuator behind the [`Positionable`] contract.
///
/// Positions are re-based so that the fully retracted stop is 0: `pos` is
/// the physical position minus the actuator's lowest stop, `max` is the
/// stroke length. An absolute move is realised the way the hardware wants
/// it: set the travel limit to the target and drive at a signed velocity
/// until the actuator settles against the limit.
pub struct Actuator {
    handle: ActuatorHandle,
    name: String,
    lowest_m: f64,
    stroke_m: f64,
    pos_m: f64,
    speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Actuator {
    /// Wrap a physical actuator. The actuator is left powered on, matching
    /// the behaviour of arm assembly: elements are live once wired.
    pub fn new(handle: ActuatorHandle) -> Self {
        let (name, lowest_m, stroke_m) = {
            let mut act = handle.borrow_mut();
            act.set_enabled(true);
            (
                act.name(),
                act.lowest_position(),
                act.highest_position() - act.lowest_position(),
            )
        };

        Self {
            handle,
            name,
            lowest_m,
            stroke_m,
            pos_m: 0.0,
            speed_ms: 0.0,
        }
    }

    /// The wrapped actuator's configured name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Positionable for Actuator {
    fn refresh(&mut self, _dt_s: f64) {
        let act = self.handle.borrow();
        self.pos_m = act.current_position() - self.lowest_m;
        self.speed_ms = act.velocity();
    }

    fn pos(&self) -> f64 {
        self.pos_m
    }

    fn max(&self) -> f64 {
        self.stroke_m
    }

    fn speed(&self) -> f64 {
        self.speed_ms
    }

    fn move_to(&mut self, pos_m: f64, speed_ms: f64) -> Result<(), MotionError> {
        let target = util::maths::clamp(pos_m, 0.0, self.stroke_m);

        let mut act = self.handle.borrow_mut();

        if target > self.pos_m + POS_EPS_M {
            act.set_max_limit(self.lowest_m + target);
            act.set_velocity(speed_ms.abs());
        } else if target < self.pos_m - POS_EPS_M {
            act.set_min_limit(self.lowest_m + target);
            act.set_velocity(-speed_ms.abs());
        }
        // Already on target: leave the current limits alone.

        Ok(())
    }

    fn set_speed(&mut self, speed_ms: f64) {
        self.handle.borrow_mut().set_velocity(speed_ms);
    }

    fn start(&mut self) {
        self.handle.borrow_mut().set_enabled(true);
    }

    fn stop(&mut self) {
        self.handle.borrow_mut().set_enabled(false);
    }

    fn sync(&mut self) -> bool {
        // A lone actuator has nothing to synchronise against.
        true
    }

    fn is_stable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mech_if::sim::SimActuator;

    #[test]
    fn test_move_to_sets_limit_and_velocity() {
        let sim = SimActuator::new("Rig 0 X+", 10.0, [1.0, 0.0, 0.0]).shared();
        let mut act = Actuator::new(sim.clone());

        act.refresh(0.1);
        act.move_to(4.0, 1.0).unwrap();

        for _ in 0..50 {
            sim.borrow_mut().step(0.1);
        }
        act.refresh(0.1);
        assert!((act.pos() - 4.0).abs() < 1e-9);

        // Retraction gets a negative velocity
        act.move_to(1.0, 1.0).unwrap();
        assert!(act.handle.borrow().velocity() < 0.0);
        for _ in 0..50 {
            sim.borrow_mut().step(0.1);
        }
        act.refresh(0.1);
        assert!((act.pos() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_clamped_to_stroke() {
        let sim = SimActuator::new("Rig 0 X+", 5.0, [1.0, 0.0, 0.0]).shared();
        let mut act = Actuator::new(sim.clone());

        act.refresh(0.1);
        act.move_to(100.0, 2.0).unwrap();
        for _ in 0..100 {
            sim.borrow_mut().step(0.1);
        }
        act.refresh(0.1);
        assert!((act.pos() - 5.0).abs() < 1e-9);
    }
}
