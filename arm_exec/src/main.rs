//! Main arm control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Plant state acquisition (actuators, stock, structure)
//!         - Tool control processing
//!         - Archiving and status reporting
//!
//! The executable drives a simulated plant: every piece of equipment the
//! arm is assembled from is a deterministic sim element stepped once per
//! cycle. Swapping in real hardware means providing another implementation
//! of the `mech_if` equipment traits, nothing in the control core changes.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{
    arm::{build_arm, find_tool_head, RefFrame},
    data_store::{DataStore, SafeModeCause},
    params::ExecParams,
    tool_ctrl::{self, ToolCtrl},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use mech_if::eqpt::{EqptRegistry, HealthMonitor, StockMonitor, ToolHead, ToolKind};
use mech_if::sim::{SimActuator, SimCrawlRig, SimHealth, SimStock, SimToolHead};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Rate the sim buffer fills at while the tool is cutting.
const SIM_FILL_RATE_PER_S: f64 = 0.02;

/// Rate the sim buffer drains at, cutting or not.
const SIM_DRAIN_RATE_PER_S: f64 = 0.005;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(StructOpt)]
#[structopt(name = "arm_exec", about = "Composite arm control executive")]
struct Opt {
    /// Executive parameter file, relative to the params directory.
    #[structopt(long, default_value = "arm_exec.toml")]
    exec_params: String,

    /// Tool control parameter file, relative to the params directory.
    #[structopt(long, default_value = "tool_ctrl.toml")]
    tool_ctrl_params: String,

    /// Stop after this many cycles. Zero runs until the fill completes.
    #[structopt(long, default_value = "0")]
    max_cycles: u128,
}

/// The simulated plant the demo executive drives.
struct SimPlant {
    actuators: Vec<Rc<RefCell<SimActuator>>>,
    crawl_rig: SimCrawlRig,
    stock: Rc<RefCell<SimStock>>,
    health: Rc<RefCell<SimHealth>>,
    tool_head: Rc<RefCell<SimToolHead>>,
    fill_ratio: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimPlant {
    /// Build the demo plant: one actuator per axis, a crawl carriage on Z,
    /// a drill head, and the stock/health collaborators.
    fn new(params: &ExecParams) -> (Self, EqptRegistry) {
        let arm = &params.arm_name;
        let mut registry = EqptRegistry::default();

        let dirs = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]];
        let names = ["X+", "Y+", "Z-"];

        let mut actuators = Vec::new();
        for i in 0..3 {
            let act = SimActuator::new(
                &format!("{} {}", arm, names[i]),
                params.sim_stroke_m[i],
                dirs[i],
            )
            .shared();
            registry.actuators.push(act.clone());
            actuators.push(act);
        }

        let crawl_rig = SimCrawlRig::new(
            &format!("{} Crawl Z", arm),
            params.crawl.travel_m / 4.0,
            [0.0, 0.0, -1.0],
        );
        registry.actuators.push(crawl_rig.slider.clone());
        registry.connectors.push(crawl_rig.top_connector.clone());
        registry.connectors.push(crawl_rig.bottom_connector.clone());
        registry.merge_blocks.push(crawl_rig.top_merge.clone());
        registry.merge_blocks.push(crawl_rig.bottom_merge.clone());

        let tool_head = SimToolHead::new(arm, ToolKind::Drill).shared();
        registry.tool_heads.push(tool_head.clone());

        let plant = Self {
            actuators,
            crawl_rig,
            stock: SimStock::new(params.sim_stop_ratio, params.sim_start_ratio).shared(),
            health: SimHealth::new(&[arm.as_str()]).shared(),
            tool_head,
            fill_ratio: 0.0,
        };

        (plant, registry)
    }

    /// Advance the plant physics by one cycle.
    fn step(&mut self, dt_s: f64) {
        for act in &self.actuators {
            act.borrow_mut().step(dt_s);
        }
        self.crawl_rig.step(dt_s);

        // Cutting feeds the buffer, the ejector drains it continuously
        if self.tool_head.borrow().is_enabled() {
            self.fill_ratio += SIM_FILL_RATE_PER_S * dt_s;
        }
        self.fill_ratio = (self.fill_ratio - SIM_DRAIN_RATE_PER_S * dt_s).max(0.0);
        self.stock.borrow_mut().set_fill_ratio(self.fill_ratio);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Composite Arm Control Executive\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load(&opt.exec_params).wrap_err("Could not load exec params")?;
    let tool_ctrl_params: tool_ctrl::Params =
        util::params::load(&opt.tool_ctrl_params).wrap_err("Could not load tool_ctrl params")?;

    info!("Parameters loaded");

    // ---- BUILD THE PLANT AND THE ARM ----

    let (mut plant, registry) = SimPlant::new(&exec_params);

    let arm = build_arm(
        &registry,
        &RefFrame::standard(),
        &exec_params.arm_name,
        &exec_params.crawl,
    )
    .wrap_err("Could not assemble the arm")?;

    let tool_head = find_tool_head(&registry, &exec_params.arm_name)
        .wrap_err("Could not find the tool head")?;

    info!(
        "Arm \"{}\" assembled, reachable extent {:?} m",
        exec_params.arm_name,
        arm.max()
    );

    // ---- MODULE INITIALISATION ----

    let mut ds = DataStore::default();

    ds.tool_ctrl
        .init(
            tool_ctrl::InitData {
                params: tool_ctrl_params,
                arm,
                tool_head,
            },
            &session,
        )
        .wrap_err("Failed to initialise ToolCtrl")?;

    info!("ToolCtrl initialised, entering main loop");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let cycles_per_s = (1.0 / exec_params.cycle_period_s).round() as u128;
    let mut last_cycle_start = Instant::now();

    loop {
        let cycle_start = Instant::now();
        let dt_s = cycle_start
            .duration_since(last_cycle_start)
            .as_secs_f64()
            .max(f64::MIN_POSITIVE);
        last_cycle_start = cycle_start;

        ds.num_cycles += 1;
        ds.is_1_hz_cycle = ds.num_cycles % cycles_per_s == 0;

        // ---- PLANT STATE ACQUISITION ----

        ds.stock_state = plant.stock.borrow().state();
        ds.structural_report = plant.health.borrow().report();

        ds.tool_ctrl_input = tool_ctrl::InputData {
            stock: ds.stock_state.clone(),
            structure: ds.structural_report.clone(),
        };

        // ---- TOOL CONTROL PROCESSING ----

        match ds.tool_ctrl.proc(dt_s, &ds.tool_ctrl_input) {
            Ok((output, report)) => {
                ds.tool_ctrl_output = output;
                ds.tool_ctrl_status_rpt = report;
            }
            Err(e) => {
                ds.make_safe(SafeModeCause::ToolCtrlError);
                return Err(eyre!("ToolCtrl processing failed: {}", e));
            }
        }

        archive(&mut ds.tool_ctrl);

        if ds.tool_ctrl_status_rpt.complete {
            ds.make_safe(SafeModeCause::FillComplete);
            info!(
                "Raster fill complete after {} cycles, exiting",
                ds.num_cycles
            );
            return Ok(());
        }

        // ---- STATUS REPORTING ----

        if ds.is_1_hz_cycle {
            let rpt = &ds.tool_ctrl_status_rpt;
            info!(
                "pos: [{:.2}, {:.2}, {:.2}] m, cell: {:?}, move: {}, {}",
                rpt.pos_m[0],
                rpt.pos_m[1],
                rpt.pos_m[2],
                rpt.pos_i,
                rpt.current_move.as_deref().unwrap_or("-"),
                match &rpt.block_reason {
                    Some(r) => format!("BLOCKED ({})", r),
                    None if !rpt.stable => "relocating".into(),
                    None => "cutting".into(),
                }
            );
        }

        // ---- PLANT PHYSICS ----

        plant.step(dt_s);

        // ---- CYCLE MANAGEMENT ----

        if opt.max_cycles != 0 && ds.num_cycles >= opt.max_cycles {
            info!("Cycle limit reached, exiting");
            return Ok(());
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < cycle_period {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(cycle_period - elapsed);
        } else {
            ds.num_consec_cycle_overruns += 1;
            warn!(
                "Cycle overran its period ({:.1} ms elapsed), {} consecutive",
                elapsed.as_secs_f64() * 1000.0,
                ds.num_consec_cycle_overruns
            );
            if ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                util::raise_error!(
                    "Exceeded the limit of {} consecutive cycle overruns",
                    exec_params.max_consec_cycle_overruns
                );
            }
        }
    }
}

/// Write the cyclic archives. Archive failures are logged, never fatal: the
/// rig keeps cutting with a broken disk.
fn archive(tool_ctrl: &mut ToolCtrl) {
    use util::archive::Archived;

    if let Err(e) = tool_ctrl.write() {
        warn!("Could not write archives: {}", e);
    }
}
