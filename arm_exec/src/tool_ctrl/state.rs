//! Implementations for the ToolCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use mech_if::eqpt::{StockLevel, StockState, StructuralReport, ToolHeadHandle};
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use crate::arm::Arm;
use crate::raster::RasterPlanner;
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session,
};

use super::{Params, ToolCtrlError, ToolCtrlInitError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tool control module state.
#[derive(Default)]
pub struct ToolCtrl {
    pub(crate) params: Params,

    arm: Option<Arm>,
    tool_head: Option<ToolHeadHandle>,
    planner: Option<RasterPlanner>,

    /// True while the stock gating allows the tool to run. Starts false so
    /// that a fresh boot waits for an explicit `Start` classification.
    running: bool,

    /// Damage latch, only re-evaluated while the arm is stable: structural
    /// connectivity cannot be trusted mid-relocation.
    damage_latched: bool,

    report: StatusReport,
    arch_report: Archiver,

    output: Option<OutputData>,
    arch_output: Archiver,
}

/// Initialisation data for ToolCtrl.
pub struct InitData {
    pub params: Params,

    /// The assembled arm this module drives.
    pub arm: Arm,

    /// The tool head mounted on the arm.
    pub tool_head: ToolHeadHandle,
}

/// Input data to Tool Control.
#[derive(Default)]
pub struct InputData {
    /// Feed-stock classification for this cycle.
    pub stock: StockState,

    /// Structural health report for this cycle.
    pub structure: StructuralReport,
}

/// Output demands issued to the arm and tool head this cycle.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct OutputData {
    /// Position demand issued to the arm.
    ///
    /// Units: meters
    pub dst_m: [f64; 3],

    /// Per-axis speed demand issued to the arm.
    ///
    /// Units: meters/second
    pub speed_ms: [f64; 3],

    /// True if the arm was commanded to move this cycle.
    pub motion_on: bool,

    /// True if the tool head was powered this cycle.
    pub tool_on: bool,
}

/// Status report for ToolCtrl processing.
#[derive(Clone, Serialize, Debug, Default)]
pub struct StatusReport {
    /// Measured arm position.
    pub pos_m: [f64; 3],

    /// Current raster target.
    pub dst_m: [f64; 3],

    /// Current raster cell.
    pub pos_i: [i64; 3],

    /// Most recent raster move, as displayed text.
    pub current_move: Option<String>,

    /// Why the rig is not cutting, if it isn't.
    pub block_reason: Option<String>,

    /// Arm stability flag, false while a crawl relocation is in progress.
    pub stable: bool,

    /// True once the raster fill has visited every cell.
    pub complete: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ToolCtrl {
    type InitData = InitData;
    type InitError = ToolCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ToolCtrlError;

    /// Initialise the ToolCtrl module.
    ///
    /// The raster plan is derived from the arm's reachable extent and the
    /// configured cell pitch; the fill always starts from the origin cell.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = init_data.params;

        self.planner = Some(RasterPlanner::new(
            &init_data.arm.max(),
            &Vector3::from(self.params.step_m),
            self.params.sweep_speed_ms,
        ));
        self.arm = Some(init_data.arm);
        self.tool_head = Some(init_data.tool_head);

        // Create the arch folder for tool_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("tool_ctrl");
        std::fs::create_dir_all(arch_path)
            .map_err(|e| ToolCtrlInitError::ArchiveInitError(e.to_string()))?;

        self.arch_report = Archiver::from_path(session, "tool_ctrl/status_report.csv")
            .map_err(|e| ToolCtrlInitError::ArchiveInitError(e.to_string()))?;
        self.arch_output = Archiver::from_path(session, "tool_ctrl/output.csv")
            .map_err(|e| ToolCtrlInitError::ArchiveInitError(e.to_string()))?;

        Ok(())
    }

    /// Perform cyclic processing of Tool Control.
    fn proc(
        &mut self,
        dt_s: f64,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let arm = self.arm.as_mut().ok_or(ToolCtrlError::NotInitialised)?;
        let planner = self.planner.as_mut().ok_or(ToolCtrlError::NotInitialised)?;
        let tool_head = self
            .tool_head
            .as_ref()
            .ok_or(ToolCtrlError::NotInitialised)?;

        arm.refresh(dt_s);

        // Damage is a hard override, but connectivity reports are only
        // meaningful while the arm is stable: during a crawl relocation the
        // structure is split by design. The latch holds its last trusted
        // value until stability returns.
        if arm.is_stable() {
            self.damage_latched = input_data.structure.is_damaged();
        }

        self.running = advance_run_state(self.running, input_data.stock.level);

        let blocked = self.damage_latched || !self.running;

        let mut output = OutputData::default();

        if blocked || planner.is_complete() {
            tool_head.borrow_mut().set_enabled(false);
            arm.stop();
        } else {
            arm.start();
            arm.sync();

            match planner.update(&arm.pos()) {
                Some((dst, speed)) => {
                    arm.move_to(&dst, &speed)?;
                    tool_head.borrow_mut().set_enabled(true);

                    output = OutputData {
                        dst_m: dst.into(),
                        speed_ms: speed.into(),
                        motion_on: true,
                        tool_on: true,
                    };
                }
                None => {
                    info!("Raster fill complete, making the rig safe");
                    tool_head.borrow_mut().set_enabled(false);
                    arm.stop();
                }
            }
        }

        self.report = StatusReport {
            pos_m: arm.pos().into(),
            dst_m: planner.dst().into(),
            pos_i: planner.pos_i(),
            current_move: planner.last_move().map(|m| m.to_string()),
            block_reason: block_reason(self.damage_latched, self.running, input_data),
            stable: arm.is_stable(),
            complete: planner.is_complete(),
        };

        trace!(
            "ToolCtrl output:\n    dst: {:?}\n    speed: {:?}",
            output.dst_m,
            output.speed_ms
        );

        self.output = Some(output);

        Ok((output, self.report.clone()))
    }
}

impl Archived for ToolCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report.clone())?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Stock gating with hysteresis: a running rig pauses only at `Stop`, an
/// idle one resumes only at `Start`. `Continue` holds the current mode, so
/// a fill level oscillating around one threshold cannot chatter the tool.
fn advance_run_state(running: bool, level: StockLevel) -> bool {
    match (running, level) {
        (true, StockLevel::Stop) => false,
        (false, StockLevel::Start) => true,
        (r, _) => r,
    }
}

/// Human-readable reason the rig is not cutting, if any.
fn block_reason(damage_latched: bool, running: bool, input: &InputData) -> Option<String> {
    if damage_latched {
        let offenders = input.structure.offenders();
        if offenders.is_empty() {
            Some("structure damaged".into())
        } else {
            Some(format!("structure damaged: {}", offenders.join(", ")))
        }
    } else if !running {
        if input.stock.deficient.is_empty() {
            Some(format!("feed stock at {}", input.stock.level))
        } else {
            Some(format!(
                "feed stock at {}, missing: {}",
                input.stock.level,
                input.stock.deficient.join(", ")
            ))
        }
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm::{build_arm, find_tool_head, RefFrame};
    use crate::crawl::CrawlParams;
    use mech_if::eqpt::{ElementHealth, EqptRegistry, HealthMonitor, StockMonitor};
    use mech_if::sim::{SimActuator, SimHealth, SimStock, SimToolHead};

    #[test]
    fn test_run_state_hysteresis() {
        use StockLevel::*;

        // Idle rig only starts at Start
        assert!(!advance_run_state(false, Continue));
        assert!(!advance_run_state(false, Stop));
        assert!(advance_run_state(false, Start));

        // Running rig only stops at Stop
        assert!(advance_run_state(true, Continue));
        assert!(advance_run_state(true, Start));
        assert!(!advance_run_state(true, Stop));
    }

    #[test]
    fn test_gating() {
        // A session is needed for the archivers
        std::env::set_var(util::host::SW_ROOT_ENV_VAR, std::env::temp_dir());
        let session = Session::new("tool_ctrl_test", "sessions").unwrap();

        let mut reg = EqptRegistry::default();
        let sims = vec![
            SimActuator::new("Rig 0 X+", 3.0, [1.0, 0.0, 0.0]).shared(),
            SimActuator::new("Rig 0 Y+", 3.0, [0.0, 1.0, 0.0]).shared(),
            SimActuator::new("Rig 0 Z+", 3.0, [0.0, 0.0, 1.0]).shared(),
        ];
        for s in &sims {
            reg.actuators.push(s.clone());
        }
        reg.tool_heads
            .push(SimToolHead::new("Rig 0", mech_if::eqpt::ToolKind::Drill).shared());

        let crawl_params = CrawlParams {
            travel_m: 10.0,
            approach_speed_ms: 0.5,
            shuttle_speed_ms: 1.0,
            grind_duration_s: 2.0,
            lock_window_m: 0.2,
            settle_m: 0.05,
        };
        let arm = build_arm(&reg, &RefFrame::standard(), "Rig 0", &crawl_params).unwrap();
        let tool_head = find_tool_head(&reg, "Rig 0").unwrap();

        let stock = SimStock::new(0.6, 0.4).shared();
        let health = SimHealth::new(&["drill"]).shared();

        let mut ctrl = ToolCtrl::default();
        ctrl.init(
            InitData {
                params: Params {
                    step_m: [1.0, 1.0, 1.0],
                    sweep_speed_ms: 1.0,
                },
                arm,
                tool_head: tool_head.clone(),
            },
            &session,
        )
        .unwrap();

        let tick = |ctrl: &mut ToolCtrl| {
            let input = InputData {
                stock: stock.borrow().state(),
                structure: health.borrow().report(),
            };
            let (out, rpt) = ctrl.proc(0.1, &input).unwrap();
            for s in &sims {
                s.borrow_mut().step(0.1);
            }
            (out, rpt)
        };

        // Stock at Start: the rig powers up and starts cutting
        let (out, rpt) = tick(&mut ctrl);
        assert!(out.tool_on);
        assert!(tool_head.borrow().is_enabled());
        assert!(rpt.block_reason.is_none());

        // Buffer fills past the stop threshold: everything halts
        stock.borrow_mut().set_fill_ratio(0.7);
        let (out, rpt) = tick(&mut ctrl);
        assert!(!out.tool_on);
        assert!(!tool_head.borrow().is_enabled());
        assert!(rpt.block_reason.is_some());

        // Draining back between the thresholds is not enough to resume
        stock.borrow_mut().set_fill_ratio(0.5);
        let (out, _) = tick(&mut ctrl);
        assert!(!out.tool_on);

        // Clear of the start threshold: cutting resumes
        stock.borrow_mut().set_fill_ratio(0.2);
        let (out, _) = tick(&mut ctrl);
        assert!(out.tool_on);

        // Damage overrides everything
        health.borrow_mut().set_element(
            "drill",
            ElementHealth {
                damaged: true,
                connected: true,
            },
        );
        let (out, rpt) = tick(&mut ctrl);
        assert!(!out.tool_on);
        assert!(rpt.block_reason.unwrap().contains("drill"));

        // And clears once repaired
        health.borrow_mut().set_element(
            "drill",
            ElementHealth {
                damaged: false,
                connected: true,
            },
        );
        let (out, _) = tick(&mut ctrl);
        assert!(out.tool_on);
    }
}
