//! Polarity decorator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{MotionError, Positionable};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Flips the sense of an element mounted against its axis.
///
/// An actuator whose extension moves the tool in the negative frame
/// direction is wrapped in `Reversed`, after which `pos = 0` means fully
/// extended hardware and `pos = max` means fully retracted. Everything above
/// the decorator reasons purely in frame coordinates.
pub struct Reversed<P: Positionable> {
    inner: P,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<P: Positionable> Reversed<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Positionable> Positionable for Reversed<P> {
    fn refresh(&mut self, dt_s: f64) {
        self.inner.refresh(dt_s);
    }

    fn pos(&self) -> f64 {
        self.inner.max() - self.inner.pos()
    }

    fn max(&self) -> f64 {
        self.inner.max()
    }

    fn speed(&self) -> f64 {
        -self.inner.speed()
    }

    fn move_to(&mut self, pos_m: f64, speed_ms: f64) -> Result<(), MotionError> {
        self.inner.move_to(self.inner.max() - pos_m, speed_ms)
    }

    fn set_speed(&mut self, speed_ms: f64) {
        self.inner.set_speed(-speed_ms);
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn sync(&mut self) -> bool {
        self.inner.sync()
    }

    fn is_stable(&self) -> bool {
        self.inner.is_stable()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion::Actuator;
    use mech_if::eqpt::LinearActuator;
    use mech_if::sim::SimActuator;

    #[test]
    fn test_reversed_mirrors_position() {
        let sim = SimActuator::new("Rig 0 X-", 10.0, [-1.0, 0.0, 0.0]).shared();
        let mut rev = Reversed::new(Actuator::new(sim.clone()));

        // Hardware fully retracted = decorator fully extended
        rev.refresh(0.1);
        assert!((rev.pos() - 10.0).abs() < 1e-9);

        // Ask for frame position 3: hardware must drive to 7
        rev.move_to(3.0, 1.0).unwrap();
        for _ in 0..100 {
            sim.borrow_mut().step(0.1);
        }
        rev.refresh(0.1);
        assert!((rev.pos() - 3.0).abs() < 1e-9);
        assert!((sim.borrow().current_position() - 7.0).abs() < 1e-9);
    }
}
