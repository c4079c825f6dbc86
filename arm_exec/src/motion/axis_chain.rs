//! Telescoping chain of motion elements

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{MotionError, Positionable, POS_EPS_M};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered chain of elements all driving along the same axis.
///
/// The chain behaves like one long telescope: its position is the sum of
/// its elements' positions, and a move is delegated to the first element
/// with spare travel in the needed direction. Callers re-issue their
/// command each tick, so once one element tops out the remainder of the
/// demand flows to the next one.
pub struct AxisChain {
    elements: Vec<Box<dyn Positionable>>,
    max_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisChain {
    pub fn new(elements: Vec<Box<dyn Positionable>>) -> Self {
        let max_m = elements.iter().map(|e| e.max()).sum();
        Self { elements, max_m }
    }

    /// Number of elements in the chain.
    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

impl Positionable for AxisChain {
    fn refresh(&mut self, dt_s: f64) {
        for element in &mut self.elements {
            element.refresh(dt_s);
        }
    }

    fn pos(&self) -> f64 {
        self.elements.iter().map(|e| e.pos()).sum()
    }

    fn max(&self) -> f64 {
        self.max_m
    }

    fn speed(&self) -> f64 {
        self.elements.iter().map(|e| e.speed()).sum()
    }

    fn move_to(&mut self, pos_m: f64, speed_ms: f64) -> Result<(), MotionError> {
        let target = util::maths::clamp(pos_m, 0.0, self.max_m);
        let needed = target - self.pos();

        if needed > POS_EPS_M {
            // Extend: first element that still has travel takes the demand,
            // clamped to its own stroke.
            for element in &mut self.elements {
                if element.pos() < element.max() - POS_EPS_M {
                    let el_target = (element.pos() + needed).min(element.max());
                    return element.move_to(el_target, speed_ms);
                }
            }
        } else if needed < -POS_EPS_M {
            // Retract: the proximal elements drain first, in the same list
            // order as extension.
            for element in &mut self.elements {
                if element.pos() > POS_EPS_M {
                    let el_target = (element.pos() + needed).max(0.0);
                    return element.move_to(el_target, speed_ms);
                }
            }
        }

        Ok(())
    }

    fn set_speed(&mut self, speed_ms: f64) {
        for element in &mut self.elements {
            element.set_speed(speed_ms);
        }
    }

    fn start(&mut self) {
        for element in &mut self.elements {
            element.start();
        }
    }

    fn stop(&mut self) {
        for element in &mut self.elements {
            element.stop();
        }
    }

    fn sync(&mut self) -> bool {
        let mut in_sync = true;
        for element in &mut self.elements {
            if !element.sync() {
                in_sync = false;
            }
        }
        in_sync
    }

    fn is_stable(&self) -> bool {
        self.elements.iter().all(|e| e.is_stable())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion::Actuator;
    use mech_if::eqpt::LinearActuator;
    use mech_if::sim::SimActuator;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn chain_of(strokes: &[f64]) -> (AxisChain, Vec<Rc<RefCell<SimActuator>>>) {
        let sims: Vec<_> = strokes
            .iter()
            .enumerate()
            .map(|(i, s)| {
                SimActuator::new(&format!("Rig 0 X+ {}", i), *s, [1.0, 0.0, 0.0]).shared()
            })
            .collect();
        let elements: Vec<Box<dyn Positionable>> = sims
            .iter()
            .map(|s| Box::new(Actuator::new(s.clone())) as Box<dyn Positionable>)
            .collect();
        (AxisChain::new(elements), sims)
    }

    /// Drive the chain like a control loop would: refresh, re-command,
    /// step the plant.
    fn run(chain: &mut AxisChain, sims: &[Rc<RefCell<SimActuator>>], target: f64, ticks: usize) {
        for _ in 0..ticks {
            chain.refresh(0.1);
            chain.move_to(target, 1.0).unwrap();
            for sim in sims {
                sim.borrow_mut().step(0.1);
            }
        }
        chain.refresh(0.1);
    }

    #[test]
    fn test_chain_sums_strokes() {
        let (chain, _) = chain_of(&[10.0, 10.0, 5.0]);
        assert!((chain.max() - 25.0).abs() < 1e-9);
        assert!(chain.pos().abs() < 1e-9);
    }

    #[test]
    fn test_telescoping_extension_order() {
        let (mut chain, sims) = chain_of(&[10.0, 10.0]);

        // Ask for 15 m: the first element must saturate before the second
        // leaves its stop. 15 m at 1 m/s needs 150 ticks of 0.1 s.
        run(&mut chain, &sims, 15.0, 200);

        assert!((sims[0].borrow().current_position() - 10.0).abs() < 1e-6);
        assert!((sims[1].borrow().current_position() - 5.0).abs() < 1e-6);
        assert!((chain.pos() - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_telescoping_retraction_drains_proximal_first() {
        let (mut chain, sims) = chain_of(&[10.0, 10.0]);

        run(&mut chain, &sims, 15.0, 200);

        // Part way through a retraction only the proximal element has
        // moved; the distal one sits where extension left it.
        run(&mut chain, &sims, 4.0, 30);
        assert!((sims[0].borrow().current_position() - 7.0).abs() < 1e-6);
        assert!((sims[1].borrow().current_position() - 5.0).abs() < 1e-6);

        // Once the proximal element bottoms out the remainder of the
        // demand flows on to the distal one.
        run(&mut chain, &sims, 4.0, 200);
        assert!(sims[0].borrow().current_position().abs() < 1e-6);
        assert!((sims[1].borrow().current_position() - 4.0).abs() < 1e-6);
        assert!((chain.pos() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_clamped_to_chain_max() {
        let (mut chain, sims) = chain_of(&[5.0, 5.0]);
        run(&mut chain, &sims, 100.0, 120);
        assert!((chain.pos() - 10.0).abs() < 1e-6);
    }
}
