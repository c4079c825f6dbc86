//! Boustrophedon raster planner
//!
//! Plans a serpentine fill of the arm's reachable box, one grid cell at a
//! time: X sweeps within a Y row, Y rows alternate direction within a Z
//! layer, Z layers advance outward. The sweep direction also alternates per
//! layer, so the path is continuous across layer boundaries, every layer
//! starts where the previous one ended.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A move commits once the head is within this distance of the target on
/// every axis. Moves are strictly sequential, never pipelined.
pub const DST_TOL_M: f64 = 0.2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One grid-cell move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterMove {
    ExtendX,
    RetractX,
    ExtendY,
    RetractY,
    ExtendZ,
    RetractZ,
}

impl std::fmt::Display for RasterMove {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RasterMove::ExtendX => write!(f, "EXTEND X"),
            RasterMove::RetractX => write!(f, "RETRACT X"),
            RasterMove::ExtendY => write!(f, "EXTEND Y"),
            RasterMove::RetractY => write!(f, "RETRACT Y"),
            RasterMove::ExtendZ => write!(f, "EXTEND Z"),
            RasterMove::RetractZ => write!(f, "RETRACT Z"),
        }
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Serpentine planner over the integer cell grid.
pub struct RasterPlanner {
    /// Cell pitch per axis.
    step: Vector3<f64>,

    /// Reachable extent per axis, clamping the final cell of each axis.
    extent: Vector3<f64>,

    /// Grid bounds, `ceil(extent / step)` per axis.
    max_i: [i64; 3],

    /// Current cell.
    pos_i: [i64; 3],

    /// Float target the head is currently driving towards.
    dst: Vector3<f64>,

    /// Most recent committed move, for status display.
    last_move: Option<RasterMove>,

    /// Base sweep speed.
    speed_ms: f64,

    complete: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RasterPlanner {
    /// Plan over a reachable box of the given extent, swept at the given
    /// cell pitch, starting in the origin cell.
    pub fn new(extent: &Vector3<f64>, step: &Vector3<f64>, speed_ms: f64) -> Self {
        let max_i = [
            util::maths::num_steps(extent[0], step[0]),
            util::maths::num_steps(extent[1], step[1]),
            util::maths::num_steps(extent[2], step[2]),
        ];

        Self {
            step: *step,
            extent: *extent,
            max_i,
            pos_i: [0, 0, 0],
            dst: Vector3::zeros(),
            last_move: None,
            speed_ms,
            complete: false,
        }
    }

    /// Current float target.
    pub fn dst(&self) -> Vector3<f64> {
        self.dst
    }

    /// Most recent committed move.
    pub fn last_move(&self) -> Option<RasterMove> {
        self.last_move
    }

    /// Current cell, for status display.
    pub fn pos_i(&self) -> [i64; 3] {
        self.pos_i
    }

    /// Grid bounds.
    pub fn max_i(&self) -> [i64; 3] {
        self.max_i
    }

    /// True once every cell has been visited.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Advance the plan given the head's current position. Returns the
    /// target and per-axis speeds to command, or None once the fill is
    /// complete.
    ///
    /// The current move only commits when the head is within [`DST_TOL_M`]
    /// of the target on every axis; until then the same target is returned
    /// again.
    pub fn update(&mut self, head_pos: &Vector3<f64>) -> Option<(Vector3<f64>, Vector3<f64>)> {
        if self.complete {
            return None;
        }

        let arrived = (0..3).all(|a| (head_pos[a] - self.dst[a]).abs() <= DST_TOL_M);
        if !arrived {
            return Some((self.dst, self.speeds()));
        }

        // Re-derive the cell from the measured position rather than
        // trusting the bookkeeping, so a restart mid-fill resumes from
        // wherever the head actually is.
        for a in 0..3 {
            self.pos_i[a] = (head_pos[a] / self.step[a]).round() as i64;
        }

        let mv = match self.select_move() {
            Some(mv) => mv,
            None => {
                self.complete = true;
                return None;
            }
        };

        self.apply(mv);
        self.last_move = Some(mv);

        for a in 0..3 {
            self.dst[a] = (self.pos_i[a] as f64 * self.step[a]).min(self.extent[a]);
        }

        Some((self.dst, self.speeds()))
    }

    /// The serpentine selection rule. None means no moves remain.
    fn select_move(&self) -> Option<RasterMove> {
        let [x, y, z] = self.pos_i;
        let [max_x, max_y, max_z] = self.max_i;

        let mv = if z % 2 == 0 {
            if y % 2 == 0 {
                if x != max_x {
                    RasterMove::ExtendX
                } else if y != max_y {
                    RasterMove::ExtendY
                } else {
                    RasterMove::ExtendZ
                }
            } else if x != 0 {
                RasterMove::RetractX
            } else if y != max_y {
                RasterMove::ExtendY
            } else {
                RasterMove::ExtendZ
            }
        } else if y % 2 == 0 {
            if x != 0 {
                RasterMove::RetractX
            } else if y != 0 {
                RasterMove::RetractY
            } else {
                RasterMove::ExtendZ
            }
        } else if x != max_x {
            RasterMove::ExtendX
        } else if y != 0 {
            RasterMove::RetractY
        } else {
            RasterMove::ExtendZ
        };

        if mv == RasterMove::ExtendZ && z == max_z {
            // Layer finished and no layers left.
            return None;
        }

        Some(mv)
    }

    fn apply(&mut self, mv: RasterMove) {
        match mv {
            RasterMove::ExtendX => self.pos_i[0] += 1,
            RasterMove::RetractX => self.pos_i[0] -= 1,
            RasterMove::ExtendY => self.pos_i[1] += 1,
            RasterMove::RetractY => self.pos_i[1] -= 1,
            RasterMove::ExtendZ => self.pos_i[2] += 1,
            RasterMove::RetractZ => self.pos_i[2] -= 1,
        }
    }

    /// Per-axis sweep speeds. Y always moves at half the base speed, and X
    /// is slowed to half on the first and last Y rows, where the head works
    /// along an exposed face.
    fn speeds(&self) -> Vector3<f64> {
        let v = self.speed_ms;
        let boundary_row = self.pos_i[1] == 0 || self.pos_i[1] == self.max_i[1];
        let vx = if boundary_row { v / 2.0 } else { v };
        Vector3::new(vx, v / 2.0, v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    /// Run the planner with an ideal head that teleports to each target.
    fn run_to_completion(planner: &mut RasterPlanner) -> Vec<([i64; 3], RasterMove)> {
        let mut head = Vector3::zeros();
        let mut trace = Vec::new();

        // Generous bound: some ticks do not commit a move
        for _ in 0..100_000 {
            match planner.update(&head) {
                Some((dst, _)) => {
                    head = dst;
                    if let Some(mv) = planner.last_move() {
                        if trace.last().map(|(p, _)| *p) != Some(planner.pos_i()) {
                            trace.push((planner.pos_i(), mv));
                        }
                    }
                }
                None => return trace,
            }
        }
        panic!("planner never completed");
    }

    #[test]
    fn test_first_row_is_an_x_sweep() {
        // 20 m of X at 2 m pitch: ten extends before the first Y move
        let mut planner = RasterPlanner::new(
            &Vector3::new(20.0, 10.0, 5.0),
            &Vector3::new(2.0, 2.0, 1.0),
            2.0,
        );

        let trace = run_to_completion(&mut planner);
        for (i, (_, mv)) in trace.iter().take(10).enumerate() {
            assert_eq!(*mv, RasterMove::ExtendX, "move {} not an X extend", i);
        }
        assert_eq!(trace[10].1, RasterMove::ExtendY);
    }

    #[test]
    fn test_full_coverage_and_move_count() {
        let mut planner = RasterPlanner::new(
            &Vector3::new(6.0, 4.0, 2.0),
            &Vector3::new(2.0, 2.0, 1.0),
            1.0,
        );
        let [mx, my, mz] = planner.max_i();

        let trace = run_to_completion(&mut planner);

        // Exactly (Mx+1)(My+1)(Mz+1) - 1 committed moves
        let expected = (mx + 1) * (my + 1) * (mz + 1) - 1;
        assert_eq!(trace.len() as i64, expected);

        // Every (x, y) pair visited exactly once per layer, and layers in
        // order
        let mut cells: HashSet<[i64; 3]> = HashSet::new();
        cells.insert([0, 0, 0]);
        let mut layer = 0;
        for (pos, _) in &trace {
            assert!(cells.insert(*pos), "cell {:?} revisited", pos);
            assert!(pos[2] >= layer, "went back a layer");
            if pos[2] > layer {
                // A layer must be complete before Z advances
                assert_eq!(
                    cells.iter().filter(|c| c[2] == layer).count() as i64,
                    (mx + 1) * (my + 1)
                );
                layer = pos[2];
            }
        }
        assert_eq!(cells.len() as i64, expected + 1);
    }

    #[test]
    fn test_no_commit_until_within_tolerance() {
        let mut planner = RasterPlanner::new(
            &Vector3::new(6.0, 4.0, 2.0),
            &Vector3::new(2.0, 2.0, 1.0),
            1.0,
        );

        // First commit from the origin
        let (dst, _) = planner.update(&Vector3::zeros()).unwrap();
        assert_eq!(dst, Vector3::new(2.0, 0.0, 0.0));

        // Head lagging beyond tolerance: same target, no new commit
        let (dst, _) = planner.update(&Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(dst, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(planner.pos_i(), [1, 0, 0]);

        // Within tolerance: the next cell commits
        let (dst, _) = planner.update(&Vector3::new(1.9, 0.0, 0.0)).unwrap();
        assert_eq!(dst, Vector3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_boundary_rows_sweep_slow() {
        let mut planner = RasterPlanner::new(
            &Vector3::new(6.0, 4.0, 2.0),
            &Vector3::new(2.0, 2.0, 1.0),
            1.0,
        );

        // First row (y = 0) is a boundary row: X at half speed
        let (_, vel) = planner.update(&Vector3::zeros()).unwrap();
        assert!((vel[0] - 0.5).abs() < 1e-9);
        assert!((vel[1] - 0.5).abs() < 1e-9);
        assert!((vel[2] - 1.0).abs() < 1e-9);
    }
}
