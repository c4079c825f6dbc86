//! Simulated connector and merge block

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use crate::eqpt::connector::{Connector, LockState, MergeBlock};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated lockable anchor point.
///
/// Alignment with a counterpart is driven by the owning rig via
/// `set_aligned`: the rig decides, from carriage geometry, when the
/// connector faces could mate. Locking only succeeds while aligned.
pub struct SimConnector {
    name: String,
    aligned: bool,
    locked: bool,
}

/// A simulated merge bridge.
///
/// The rig drives `set_aligned`; the bridge reports connected only while
/// both enabled and aligned.
pub struct SimMergeBlock {
    name: String,
    enabled: bool,
    aligned: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimConnector {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aligned: false,
            locked: false,
        }
    }

    /// Create a connector already locked to its counterpart.
    pub fn new_locked(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aligned: true,
            locked: true,
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Rig input: whether a counterpart is currently within locking range.
    /// A locked connector stays locked even if the rig reports misalignment,
    /// the lock itself is what holds the faces together.
    pub fn set_aligned(&mut self, aligned: bool) {
        self.aligned = aligned;
    }
}

impl Connector for SimConnector {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn lock_state(&self) -> LockState {
        if self.locked {
            LockState::Locked
        } else if self.aligned {
            LockState::Lockable
        } else {
            LockState::Unlocked
        }
    }

    fn lock(&mut self) {
        if self.aligned {
            self.locked = true;
        }
    }

    fn unlock(&mut self) {
        self.locked = false;
    }
}

impl SimMergeBlock {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: false,
            aligned: false,
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Rig input: whether the bridge faces are currently mated.
    pub fn set_aligned(&mut self, aligned: bool) {
        self.aligned = aligned;
    }
}

impl MergeBlock for SimMergeBlock {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_connected(&self) -> bool {
        self.enabled && self.aligned
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lock_requires_alignment() {
        let mut conn = SimConnector::new("Rig 0 Crawl Z bottom");
        assert_eq!(conn.lock_state(), LockState::Unlocked);

        // Lock commands while unaligned do nothing
        conn.lock();
        assert_eq!(conn.lock_state(), LockState::Unlocked);

        conn.set_aligned(true);
        assert_eq!(conn.lock_state(), LockState::Lockable);
        conn.lock();
        assert_eq!(conn.lock_state(), LockState::Locked);

        // Lock holds even if the rig drifts out of alignment
        conn.set_aligned(false);
        assert_eq!(conn.lock_state(), LockState::Locked);

        conn.unlock();
        assert_eq!(conn.lock_state(), LockState::Unlocked);
    }

    #[test]
    fn test_merge_connection() {
        let mut merge = SimMergeBlock::new("Rig 0 Crawl Z merge top");
        merge.set_aligned(true);
        assert!(!merge.is_connected());

        merge.set_enabled(true);
        assert!(merge.is_connected());

        merge.set_aligned(false);
        assert!(!merge.is_connected());
    }
}
