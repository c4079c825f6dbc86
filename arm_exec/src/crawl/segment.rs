//! Crawl segment state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use mech_if::eqpt::{ActuatorHandle, ConnectorHandle, LockState, MergeBlockHandle};

// Internal
use crate::motion::{Actuator, MotionError, Positionable, POS_EPS_M};

use super::{CrawlError, CrawlParams, CrawlState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One crawlable axis element.
///
/// Owns a slider actuator, the two anchor connectors and the two merge
/// bridges of a crawl carriage. Externally it is just another
/// [`Positionable`] with a stroke of `travel_m`; internally it runs the
/// sixteen-state relocation protocol whenever the commanded position lies
/// beyond the slider's physical stroke.
///
/// While relocating, the reported position is frozen at its last
/// steady-state value and [`CrawlSegment::is_stable`] is false. The machine
/// advances at most one state per tick, each advance gated on a physical
/// confirmation, so a lost confirmation simply holds the protocol in place
/// until the mechanism catches up.
pub struct CrawlSegment {
    name: String,
    slider: Actuator,
    top_conn: ConnectorHandle,
    bottom_conn: ConnectorHandle,
    top_merge: MergeBlockHandle,
    bottom_merge: MergeBlockHandle,
    params: CrawlParams,

    state: CrawlState,

    /// Travel committed by completed relocations.
    base_m: f64,

    /// Reported position while outside `TranslatingLoad`.
    frozen_pos_m: f64,

    /// Remaining dwell in the `Grind` state.
    grind_remaining_s: f64,

    stroke_m: f64,
    target_m: f64,
    cmd_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CrawlSegment {
    /// Build a segment, detecting the starting state from the anchor locks:
    /// a locked trailing (bottom) anchor means normal translation, a locked
    /// leading (top) anchor alone means the previous session stopped
    /// mid-relocation and the walk resumes at the slider retraction step.
    /// Neither anchor locked is a mechanical inconsistency the operator has
    /// to resolve, not something software can recover.
    pub fn new(
        name: String,
        slider: ActuatorHandle,
        top_conn: ConnectorHandle,
        bottom_conn: ConnectorHandle,
        top_merge: MergeBlockHandle,
        bottom_merge: MergeBlockHandle,
        params: CrawlParams,
    ) -> Result<Self, CrawlError> {
        let mut slider = Actuator::new(slider);
        slider.refresh(0.0);
        let stroke_m = slider.max();

        let bottom_locked = bottom_conn.borrow().lock_state() == LockState::Locked;
        let top_locked = top_conn.borrow().lock_state() == LockState::Locked;

        let state = if bottom_locked {
            CrawlState::TranslatingLoad
        } else if top_locked {
            warn!(
                "Crawl segment \"{}\" found mid-relocation (only the leading \
                 anchor is locked), resuming the walk at slider retraction",
                name
            );
            CrawlState::TranslatingSlider
        } else {
            return Err(CrawlError::NoAnchorLocked { name });
        };

        let frozen_pos_m = match state {
            CrawlState::TranslatingLoad => slider.pos(),
            // Mid-relocation the load hangs off the leading anchor, one
            // full stroke ahead of the trailing seat.
            _ => stroke_m,
        };

        Ok(Self {
            name,
            slider,
            top_conn,
            bottom_conn,
            top_merge,
            bottom_merge,
            params,
            state,
            base_m: 0.0,
            frozen_pos_m,
            grind_remaining_s: 0.0,
            stroke_m,
            target_m: frozen_pos_m,
            cmd_speed_ms: 0.0,
        })
    }

    /// Current protocol state, for status reporting.
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// The segment's configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn cmd_slider(&mut self, pos_m: f64, speed_ms: f64) {
        // The slider is a leaf actuator, its move_to cannot fail.
        if let Err(e) = self.slider.move_to(pos_m, speed_ms) {
            warn!("Crawl segment \"{}\" slider refused a move: {}", self.name, e);
        }
    }

    fn enter(&mut self, state: CrawlState) {
        debug!(
            "Crawl segment \"{}\": {} -> {}",
            self.name, self.state, state
        );
        self.state = state;

        if state == CrawlState::Grind {
            self.grind_remaining_s = self.params.grind_duration_s;
        }

        // Issue the new state's command immediately so no tick is wasted.
        self.issue_state_cmd();
    }

    /// Issue the slider/equipment command the current state calls for.
    /// Idempotent: re-issuing an already-active command is a no-op at the
    /// hardware.
    fn issue_state_cmd(&mut self) {
        let approach = self.params.approach_speed_ms;
        let shuttle = self.params.shuttle_speed_ms;
        let stroke = self.stroke_m;
        let lock_win = self.params.lock_window_m;

        match self.state {
            CrawlState::TranslatingLoad => {
                // Commanded from move_to, nothing to do here.
            }
            CrawlState::MergeTopSlideUp => {
                self.top_merge.borrow_mut().set_enabled(true);
                self.cmd_slider(stroke, approach);
            }
            CrawlState::MergeTopSlideDown => {
                self.cmd_slider(stroke - lock_win, approach);
            }
            CrawlState::BigSyncTopConnector => {
                self.cmd_slider(stroke, approach);
            }
            CrawlState::BigLockingTopConnector => {
                self.top_conn.borrow_mut().lock();
            }
            CrawlState::UnlockingBottom => {
                self.bottom_conn.borrow_mut().unlock();
            }
            CrawlState::TranslatingSlider => {
                self.cmd_slider(0.0, shuttle);
            }
            CrawlState::Grind => {
                // Pure dwell, the countdown runs in refresh.
            }
            CrawlState::MergeBottomSlideDown => {
                self.bottom_merge.borrow_mut().set_enabled(true);
                self.cmd_slider(0.0, approach);
            }
            CrawlState::MergeBottomSlideUp => {
                self.cmd_slider(lock_win, approach);
            }
            CrawlState::LockingBottomConnector => {
                self.bottom_conn.borrow_mut().lock();
            }
            CrawlState::RewindTopConnector => {
                self.top_conn.borrow_mut().unlock();
            }
            CrawlState::SmallSyncTopConnector => {
                self.cmd_slider(0.0, approach);
            }
            CrawlState::SmallLockingTopConnector => {
                self.top_conn.borrow_mut().lock();
            }
            CrawlState::UnlockingBottomMergeBlock => {
                self.top_merge.borrow_mut().set_enabled(false);
                self.bottom_merge.borrow_mut().set_enabled(false);
            }
            CrawlState::RewindLoad => {
                self.cmd_slider(0.0, approach);
            }
        }
    }

    /// Advance the relocation protocol by at most one state, gated on the
    /// physical precondition of the current state. Called once per tick
    /// while outside `TranslatingLoad`.
    fn step_relocation(&mut self) {
        let stroke = self.stroke_m;
        let settle = self.params.settle_m;
        let lock_win = self.params.lock_window_m;
        let slider_pos = self.slider.pos();

        match self.state {
            CrawlState::TranslatingLoad => {}

            CrawlState::MergeTopSlideUp => {
                if slider_pos >= stroke - settle {
                    self.enter(CrawlState::MergeTopSlideDown);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::MergeTopSlideDown => {
                if self.top_merge.borrow().is_connected() {
                    self.enter(CrawlState::BigSyncTopConnector);
                } else if slider_pos <= stroke - lock_win + settle {
                    // No connection on this pass, jiggle back up.
                    self.enter(CrawlState::MergeTopSlideUp);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::BigSyncTopConnector => {
                if self.top_conn.borrow().lock_state() != LockState::Unlocked {
                    self.enter(CrawlState::BigLockingTopConnector);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::BigLockingTopConnector => {
                if self.top_conn.borrow().lock_state() == LockState::Locked {
                    self.enter(CrawlState::UnlockingBottom);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::UnlockingBottom => {
                if self.bottom_conn.borrow().lock_state() != LockState::Locked {
                    self.enter(CrawlState::TranslatingSlider);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::TranslatingSlider => {
                if slider_pos <= settle {
                    self.enter(CrawlState::Grind);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::Grind => {
                if self.grind_remaining_s <= 0.0 {
                    self.enter(CrawlState::MergeBottomSlideDown);
                }
            }
            CrawlState::MergeBottomSlideDown => {
                if self.bottom_merge.borrow().is_connected() {
                    self.enter(CrawlState::LockingBottomConnector);
                } else if slider_pos <= settle {
                    self.enter(CrawlState::MergeBottomSlideUp);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::MergeBottomSlideUp => {
                if self.bottom_merge.borrow().is_connected() {
                    self.enter(CrawlState::LockingBottomConnector);
                } else if slider_pos >= lock_win - settle {
                    self.enter(CrawlState::MergeBottomSlideDown);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::LockingBottomConnector => {
                if self.bottom_conn.borrow().lock_state() == LockState::Locked {
                    self.enter(CrawlState::RewindTopConnector);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::RewindTopConnector => {
                if self.top_conn.borrow().lock_state() != LockState::Locked {
                    self.enter(CrawlState::SmallSyncTopConnector);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::SmallSyncTopConnector => {
                if self.top_conn.borrow().lock_state() != LockState::Unlocked {
                    self.enter(CrawlState::SmallLockingTopConnector);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::SmallLockingTopConnector => {
                if self.top_conn.borrow().lock_state() == LockState::Locked {
                    self.enter(CrawlState::UnlockingBottomMergeBlock);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::UnlockingBottomMergeBlock => {
                let released = !self.top_merge.borrow().is_connected()
                    && !self.bottom_merge.borrow().is_connected();
                if released {
                    self.enter(CrawlState::RewindLoad);
                } else {
                    self.issue_state_cmd();
                }
            }
            CrawlState::RewindLoad => {
                if slider_pos <= settle {
                    // The anchor walk is complete: one full stroke of travel
                    // is now behind the trailing seat.
                    self.base_m += stroke;
                    debug!(
                        "Crawl segment \"{}\" relocation complete, base now \
                         {:.3} m",
                        self.name, self.base_m
                    );
                    self.enter(CrawlState::TranslatingLoad);
                } else {
                    self.issue_state_cmd();
                }
            }
        }
    }
}

impl Positionable for CrawlSegment {
    fn refresh(&mut self, dt_s: f64) {
        self.slider.refresh(dt_s);

        if self.state == CrawlState::Grind {
            self.grind_remaining_s -= dt_s;
        }

        // The relocation runs to completion on its own, regardless of
        // whether the caller keeps re-issuing its target.
        if self.state != CrawlState::TranslatingLoad {
            self.step_relocation();
        }
    }

    fn pos(&self) -> f64 {
        match self.state {
            CrawlState::TranslatingLoad => self.base_m + self.slider.pos(),
            _ => self.frozen_pos_m,
        }
    }

    fn max(&self) -> f64 {
        self.params.travel_m
    }

    fn speed(&self) -> f64 {
        match self.state {
            CrawlState::TranslatingLoad => self.slider.speed(),
            // The load is held still while the carriage walks.
            _ => 0.0,
        }
    }

    fn move_to(&mut self, pos_m: f64, speed_ms: f64) -> Result<(), MotionError> {
        if pos_m < self.pos() - POS_EPS_M {
            warn!(
                "Crawl segment \"{}\" cannot retract: at {:.3} m, commanded \
                 {:.3} m",
                self.name,
                self.pos(),
                pos_m
            );
            return Err(MotionError::CrawlRetractUnsupported {
                name: self.name.clone(),
                pos_m: self.pos(),
                target_m: pos_m,
            });
        }

        self.target_m = util::maths::clamp(pos_m, 0.0, self.params.travel_m);
        self.cmd_speed_ms = speed_ms;

        if self.state != CrawlState::TranslatingLoad {
            // Relocation in progress, the new target takes effect when the
            // walk completes.
            return Ok(());
        }

        let slider_target =
            util::maths::clamp(self.target_m - self.base_m, 0.0, self.stroke_m);

        // A target beyond the slider stroke means the carriage has to walk:
        // extend fully first, then start the relocation protocol.
        let needs_walk = self.target_m - self.base_m > self.stroke_m + POS_EPS_M;

        if needs_walk && self.slider.pos() >= self.stroke_m - self.params.settle_m {
            self.frozen_pos_m = self.base_m + self.slider.pos();
            self.enter(CrawlState::MergeTopSlideUp);
            return Ok(());
        }

        // The leading connector parks locked at the bottom seat between
        // relocations and has to come free before the slider can extend.
        if slider_target > self.slider.pos() + POS_EPS_M
            && self.top_conn.borrow().lock_state() == LockState::Locked
        {
            self.top_conn.borrow_mut().unlock();
            return Ok(());
        }

        self.cmd_slider(slider_target, speed_ms);
        Ok(())
    }

    fn set_speed(&mut self, speed_ms: f64) {
        if self.state == CrawlState::TranslatingLoad {
            self.slider.set_speed(speed_ms);
        }
    }

    fn start(&mut self) {
        self.slider.start();
    }

    fn stop(&mut self) {
        self.slider.stop();
    }

    fn sync(&mut self) -> bool {
        true
    }

    fn is_stable(&self) -> bool {
        self.state == CrawlState::TranslatingLoad
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mech_if::eqpt::Connector;
    use mech_if::sim::SimCrawlRig;

    const PARAMS: CrawlParams = CrawlParams {
        travel_m: 10.0,
        approach_speed_ms: 0.5,
        shuttle_speed_ms: 1.0,
        grind_duration_s: 2.0,
        lock_window_m: 0.2,
        settle_m: 0.05,
    };

    fn segment_and_rig(stroke_m: f64) -> (CrawlSegment, SimCrawlRig) {
        let rig = SimCrawlRig::new("Rig 0 Crawl Z", stroke_m, [0.0, 0.0, -1.0]);
        let seg = CrawlSegment::new(
            "Rig 0 Crawl Z".into(),
            rig.slider.clone(),
            rig.top_connector.clone(),
            rig.bottom_connector.clone(),
            rig.top_merge.clone(),
            rig.bottom_merge.clone(),
            PARAMS,
        )
        .unwrap();
        (seg, rig)
    }

    /// One control tick: refresh, re-command, step plant.
    fn tick(seg: &mut CrawlSegment, rig: &mut SimCrawlRig, target: f64) {
        seg.refresh(0.1);
        seg.move_to(target, 1.0).unwrap();
        rig.step(0.1);
    }

    #[test]
    fn test_starts_translating_when_bottom_locked() {
        let (seg, _rig) = segment_and_rig(2.5);
        assert_eq!(seg.state(), CrawlState::TranslatingLoad);
        assert!(seg.is_stable());
        assert!(seg.pos().abs() < 1e-9);
    }

    #[test]
    fn test_no_anchor_is_fatal() {
        let rig = SimCrawlRig::new("Rig 0 Crawl Z", 2.5, [0.0, 0.0, -1.0]);
        rig.bottom_connector.borrow_mut().unlock();

        let res = CrawlSegment::new(
            "Rig 0 Crawl Z".into(),
            rig.slider.clone(),
            rig.top_connector.clone(),
            rig.bottom_connector.clone(),
            rig.top_merge.clone(),
            rig.bottom_merge.clone(),
            PARAMS,
        );
        assert!(matches!(res, Err(CrawlError::NoAnchorLocked { .. })));
    }

    #[test]
    fn test_retract_rejected() {
        let (mut seg, mut rig) = segment_and_rig(2.5);

        for _ in 0..30 {
            tick(&mut seg, &mut rig, 1.0);
        }
        assert!((seg.pos() - 1.0).abs() < 0.05);

        assert!(matches!(
            seg.move_to(0.2, 1.0),
            Err(MotionError::CrawlRetractUnsupported { .. })
        ));
    }

    #[test]
    fn test_in_stroke_move_never_relocates() {
        let (mut seg, mut rig) = segment_and_rig(2.5);

        for _ in 0..50 {
            tick(&mut seg, &mut rig, 2.0);
            assert_eq!(seg.state(), CrawlState::TranslatingLoad);
        }
        assert!((seg.pos() - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_full_relocation_walk() {
        let (mut seg, mut rig) = segment_and_rig(2.5);

        // Target beyond one stroke forces a walk. Record every state seen
        // and check the position never goes backwards.
        let mut seen = Vec::new();
        let mut last_pos = seg.pos();

        for _ in 0..2000 {
            tick(&mut seg, &mut rig, 4.0);

            if seen.last() != Some(&seg.state()) {
                seen.push(seg.state());
            }

            assert!(
                seg.pos() >= last_pos - 1e-9,
                "position went backwards: {} -> {}",
                last_pos,
                seg.pos()
            );
            last_pos = seg.pos();

            if seg.is_stable() && (seg.pos() - 4.0).abs() < 0.05 {
                break;
            }
        }

        assert!((seg.pos() - 4.0).abs() < 0.05, "never reached target");
        assert!(seg.is_stable());

        // Every protocol state must have been visited on the way.
        use CrawlState::*;
        for state in [
            MergeTopSlideUp,
            BigSyncTopConnector,
            BigLockingTopConnector,
            UnlockingBottom,
            TranslatingSlider,
            Grind,
            MergeBottomSlideDown,
            LockingBottomConnector,
            RewindTopConnector,
            SmallSyncTopConnector,
            SmallLockingTopConnector,
            UnlockingBottomMergeBlock,
            RewindLoad,
        ] {
            assert!(seen.contains(&state), "state {} never visited", state);
        }
    }

    #[test]
    fn test_unstable_while_walking() {
        let (mut seg, mut rig) = segment_and_rig(2.5);

        let mut went_unstable = false;
        for _ in 0..2000 {
            tick(&mut seg, &mut rig, 4.0);
            if !seg.is_stable() {
                went_unstable = true;
                // Position must be frozen while unstable
                assert!((seg.pos() - seg.frozen_pos_m).abs() < 1e-9);
            }
            if went_unstable && seg.is_stable() {
                break;
            }
        }
        assert!(went_unstable);
        assert!(seg.is_stable());
    }
}
