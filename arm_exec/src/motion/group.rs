//! Parallel actuator group

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{Actuator, MotionError, Positionable, SYNC_TOL_M};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A set of actuators mounted in parallel which must move as one.
///
/// All members share a single commanded target and speed. The group reports
/// the position of its furthest-advanced member, so a partially-seized group
/// never under-reports how far the structure has physically moved.
pub struct ActuatorGroup {
    members: Vec<Actuator>,
    stroke_m: f64,
    cmd_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ActuatorGroup {
    /// Build a group from its members, checking that every member has the
    /// same stroke. Mixed strokes cannot track a shared target and are
    /// rejected at assembly time rather than discovered mid-motion.
    pub fn new(members: Vec<Actuator>) -> Result<Self, MotionError> {
        let first = members.first().ok_or(MotionError::EmptyGroup)?;
        let stroke_m = first.max();

        for member in &members {
            if (member.max() - stroke_m).abs() > f64::EPSILON {
                return Err(MotionError::MismatchedStroke {
                    name: member.name().into(),
                    stroke_m: member.max(),
                    group_stroke_m: stroke_m,
                });
            }
        }

        Ok(Self {
            members,
            stroke_m,
            cmd_speed_ms: 0.0,
        })
    }

    /// Number of actuators in the group.
    pub fn len(&self) -> usize {
        self.members.len()
    }
}

impl Positionable for ActuatorGroup {
    fn refresh(&mut self, dt_s: f64) {
        for member in &mut self.members {
            member.refresh(dt_s);
        }
    }

    fn pos(&self) -> f64 {
        self.members
            .iter()
            .map(|m| m.pos())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn max(&self) -> f64 {
        self.stroke_m
    }

    fn speed(&self) -> f64 {
        self.members
            .iter()
            .map(|m| m.speed())
            .fold(0.0, |a, b| if b.abs() > a.abs() { b } else { a })
    }

    fn move_to(&mut self, pos_m: f64, speed_ms: f64) -> Result<(), MotionError> {
        self.cmd_speed_ms = speed_ms;
        for member in &mut self.members {
            member.move_to(pos_m, speed_ms)?;
        }
        Ok(())
    }

    fn set_speed(&mut self, speed_ms: f64) {
        self.cmd_speed_ms = speed_ms;
        for member in &mut self.members {
            member.set_speed(speed_ms);
        }
    }

    fn start(&mut self) {
        for member in &mut self.members {
            member.start();
        }
    }

    fn stop(&mut self) {
        for member in &mut self.members {
            member.stop();
        }
    }

    fn sync(&mut self) -> bool {
        let leader = self.pos();
        let mut in_sync = true;

        for member in &mut self.members {
            if leader - member.pos() > SYNC_TOL_M {
                in_sync = false;

                // Nudge the laggard towards the leader at the last commanded
                // speed. Nudge failures are logged, not fatal: a jammed
                // member will simply keep the group out of sync.
                if let Err(e) = member.move_to(leader, self.cmd_speed_ms.abs()) {
                    warn!("Could not nudge {:?} towards group leader: {}", member.name(), e);
                }
            }
        }

        in_sync
    }

    fn is_stable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mech_if::sim::SimActuator;

    fn group_of(n: usize, stroke_m: f64) -> (ActuatorGroup, Vec<std::rc::Rc<std::cell::RefCell<SimActuator>>>) {
        let sims: Vec<_> = (0..n)
            .map(|i| SimActuator::new(&format!("Rig 0 X+ {}", i), stroke_m, [1.0, 0.0, 0.0]).shared())
            .collect();
        let members = sims
            .iter()
            .map(|s| Actuator::new(s.clone()))
            .collect();
        (ActuatorGroup::new(members).unwrap(), sims)
    }

    #[test]
    fn test_empty_group_rejected() {
        assert!(matches!(
            ActuatorGroup::new(vec![]),
            Err(MotionError::EmptyGroup)
        ));
    }

    #[test]
    fn test_mismatched_stroke_rejected() {
        let a = Actuator::new(SimActuator::new("Rig 0 X+ 0", 10.0, [1.0, 0.0, 0.0]).shared());
        let b = Actuator::new(SimActuator::new("Rig 0 X+ 1", 8.0, [1.0, 0.0, 0.0]).shared());

        assert!(matches!(
            ActuatorGroup::new(vec![a, b]),
            Err(MotionError::MismatchedStroke { .. })
        ));
    }

    #[test]
    fn test_pos_is_furthest_member() {
        let (mut group, sims) = group_of(2, 10.0);

        sims[0].borrow_mut().force_position(3.0);
        sims[1].borrow_mut().force_position(1.0);
        group.refresh(0.1);

        assert!((group.pos() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sync_nudges_laggard() {
        let (mut group, sims) = group_of(2, 10.0);

        group.move_to(5.0, 1.0).unwrap();
        sims[0].borrow_mut().force_position(5.0);
        // Member 1 left well behind the sync tolerance
        sims[1].borrow_mut().force_position(2.0);
        group.refresh(0.1);

        assert!(!group.sync());

        // After the nudge the laggard should be driving forwards
        for _ in 0..100 {
            sims[1].borrow_mut().step(0.1);
        }
        group.refresh(0.1);
        assert!(group.sync());
        assert!((group.pos() - 5.0).abs() < SYNC_TOL_M);
    }
}
