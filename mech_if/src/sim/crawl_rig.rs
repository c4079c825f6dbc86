//! Simulated crawl carriage

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use crate::eqpt::LinearActuator;

use super::{SimActuator, SimConnector, SimMergeBlock};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The full equipment complement of one crawl carriage: a slider actuator,
/// leading and trailing connectors, and the two merge bridges.
///
/// The rig owns the alignment geometry: after stepping the slider physics
/// it recomputes, from the slider position alone, which connector and merge
/// faces are currently within mating range. Both merge faces sit at the
/// slider's travel extremes, and the leading connector has a seat at each
/// end of travel.
pub struct SimCrawlRig {
    pub slider: Rc<RefCell<SimActuator>>,
    pub top_connector: Rc<RefCell<SimConnector>>,
    pub bottom_connector: Rc<RefCell<SimConnector>>,
    pub top_merge: Rc<RefCell<SimMergeBlock>>,
    pub bottom_merge: Rc<RefCell<SimMergeBlock>>,

    stroke_m: f64,
    lock_window_m: f64,
    merge_window_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimCrawlRig {
    /// Build a rig whose equipment names share the given base, e.g.
    /// `"Rig 0 Crawl Z"` yields a slider of that name, connectors
    /// `"... top"`/`"... bottom"` and merges `"... merge top"`/
    /// `"... merge bottom"`. The bottom connector starts locked: a freshly
    /// built carriage rests on its trailing anchor.
    pub fn new(base_name: &str, stroke_m: f64, world_dir: [f64; 3]) -> Self {
        Self {
            slider: SimActuator::new(base_name, stroke_m, world_dir).shared(),
            top_connector: SimConnector::new(&format!("{} top", base_name)).shared(),
            bottom_connector: SimConnector::new_locked(&format!("{} bottom", base_name)).shared(),
            top_merge: SimMergeBlock::new(&format!("{} merge top", base_name)).shared(),
            bottom_merge: SimMergeBlock::new(&format!("{} merge bottom", base_name)).shared(),
            stroke_m,
            lock_window_m: 0.2,
            merge_window_m: 0.5,
        }
    }

    /// Advance the carriage physics and recompute face alignments.
    pub fn step(&mut self, dt_s: f64) {
        let mut slider = self.slider.borrow_mut();
        slider.step(dt_s);
        let pos = slider.current_position();
        drop(slider);

        self.top_merge
            .borrow_mut()
            .set_aligned(pos >= self.stroke_m - self.merge_window_m);
        self.bottom_merge
            .borrow_mut()
            .set_aligned(pos <= self.merge_window_m);

        // The leading connector has a seat at each end of slider travel,
        // the trailing one only at the bottom.
        self.top_connector.borrow_mut().set_aligned(
            pos >= self.stroke_m - self.lock_window_m || pos <= self.lock_window_m,
        );
        self.bottom_connector
            .borrow_mut()
            .set_aligned(pos <= self.lock_window_m);
    }
}
