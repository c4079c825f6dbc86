//! Arm assembly
//!
//! An [`Arm`] is three independent axis chains sharing a tool head. Axes
//! are deliberately uncoordinated: the raster planner only ever changes one
//! axis target at a time, so there is nothing to coordinate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod builder;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use builder::{build_arm, find_tool_head, Axis, BuildError, RefFrame};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use crate::motion::{AxisChain, MotionError, Positionable};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A three-axis composite manipulator.
pub struct Arm {
    name: String,
    x: AxisChain,
    y: AxisChain,
    z: AxisChain,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Arm {
    pub fn new(name: String, x: AxisChain, y: AxisChain, z: AxisChain) -> Self {
        Self { name, x, y, z }
    }

    /// The arm's configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Re-read physical state on all three axes. Call once per tick.
    pub fn refresh(&mut self, dt_s: f64) {
        self.x.refresh(dt_s);
        self.y.refresh(dt_s);
        self.z.refresh(dt_s);
    }

    /// Current tool head position in the arm frame.
    pub fn pos(&self) -> Vector3<f64> {
        Vector3::new(self.x.pos(), self.y.pos(), self.z.pos())
    }

    /// Reachable extent per axis.
    pub fn max(&self) -> Vector3<f64> {
        Vector3::new(self.x.max(), self.y.max(), self.z.max())
    }

    /// Command each axis independently towards the given position at the
    /// given per-axis speeds.
    pub fn move_to(
        &mut self,
        pos: &Vector3<f64>,
        speed: &Vector3<f64>,
    ) -> Result<(), MotionError> {
        self.x.move_to(pos[0], speed[0])?;
        self.y.move_to(pos[1], speed[1])?;
        self.z.move_to(pos[2], speed[2])?;
        Ok(())
    }

    /// Issue corrective moves to any out-of-sync constituents. Returns true
    /// once everything is converged.
    pub fn sync(&mut self) -> bool {
        let x = self.x.sync();
        let y = self.y.sync();
        let z = self.z.sync();
        x && y && z
    }

    /// False while any axis element is mid-relocation, in which case fine
    /// positional feedback and structural connectivity cannot be trusted.
    pub fn is_stable(&self) -> bool {
        self.x.is_stable() && self.y.is_stable() && self.z.is_stable()
    }

    /// Power up every element.
    pub fn start(&mut self) {
        self.x.start();
        self.y.start();
        self.z.start();
    }

    /// Power down every element, halting all motion.
    pub fn stop(&mut self) {
        self.x.stop();
        self.y.stop();
        self.z.stop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crawl::CrawlParams;
    use crate::raster::RasterPlanner;
    use mech_if::eqpt::{EqptRegistry, ToolKind};
    use mech_if::sim::{SimActuator, SimCrawlRig, SimToolHead};
    use nalgebra::Vector3;

    /// Drive a full arm through a complete raster fill: a two-station X
    /// chain, a single Y actuator, and a Z axis made of an inverted-mount
    /// actuator plus a crawl carriage that has to walk once to reach the
    /// deepest layer.
    #[test]
    fn test_raster_scan_end_to_end() {
        let mut reg = EqptRegistry::default();

        let sims = vec![
            SimActuator::new("Rig 0 X+", 10.0, [1.0, 0.0, 0.0]).shared(),
            SimActuator::new("Rig 0 X+ 1", 10.0, [1.0, 0.0, 0.0]).shared(),
            SimActuator::new("Rig 0 Y+", 10.0, [0.0, 1.0, 0.0]).shared(),
            SimActuator::new("Rig 0 Z-", 2.0, [0.0, 0.0, -1.0]).shared(),
        ];
        for sim in &sims {
            reg.actuators.push(sim.clone());
        }

        let mut rig = SimCrawlRig::new("Rig 0 Crawl Z", 2.5, [0.0, 0.0, -1.0]);
        reg.actuators.push(rig.slider.clone());
        reg.connectors.push(rig.top_connector.clone());
        reg.connectors.push(rig.bottom_connector.clone());
        reg.merge_blocks.push(rig.top_merge.clone());
        reg.merge_blocks.push(rig.bottom_merge.clone());

        reg.tool_heads
            .push(SimToolHead::new("Rig 0", ToolKind::Drill).shared());

        let crawl_params = CrawlParams {
            travel_m: 3.0,
            approach_speed_ms: 0.5,
            shuttle_speed_ms: 1.0,
            grind_duration_s: 2.0,
            lock_window_m: 0.2,
            settle_m: 0.05,
        };
        let mut arm = build_arm(
            &reg,
            &RefFrame::standard(),
            "Rig 0",
            &crawl_params,
        )
        .unwrap();

        assert_eq!(arm.max(), Vector3::new(20.0, 10.0, 5.0));

        let mut planner =
            RasterPlanner::new(&arm.max(), &Vector3::new(2.0, 2.0, 1.0), 1.0);
        let [mx, my, mz] = planner.max_i();

        let mut commits = 0i64;
        let mut saw_relocation = false;
        let mut done = false;

        for _ in 0..400_000 {
            arm.refresh(0.1);
            arm.sync();

            if !arm.is_stable() {
                saw_relocation = true;
            }

            let before = planner.pos_i();
            match planner.update(&arm.pos()) {
                Some((dst, speed)) => {
                    if planner.pos_i() != before {
                        commits += 1;
                    }
                    arm.move_to(&dst, &speed).unwrap();
                }
                None => {
                    done = true;
                    break;
                }
            }

            for sim in &sims {
                sim.borrow_mut().step(0.1);
            }
            rig.step(0.1);
        }

        assert!(done, "fill never completed");
        assert_eq!(commits, (mx + 1) * (my + 1) * (mz + 1) - 1);
        assert!(saw_relocation, "the crawl carriage never walked");
        assert!(arm.is_stable());
    }
}
