//! Connector and merge block equipment interfaces
//!
//! Connectors are the lockable anchor points a crawl segment walks between;
//! merge blocks are the rigid bridges that hold two structures fixed
//! relative to each other while load is transferred from one anchor to the
//! other.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared handle to a connector.
pub type ConnectorHandle = Rc<RefCell<dyn Connector>>;

/// Shared handle to a merge block.
pub type MergeBlockHandle = Rc<RefCell<dyn MergeBlock>>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Mechanical state of a connector's lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    /// Rigidly locked to its counterpart.
    Locked,

    /// Aligned with a counterpart and able to lock on command.
    Lockable,

    /// Not locked and not aligned with any counterpart.
    Unlocked,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A lockable anchor point.
pub trait Connector {
    /// The connector's configured name.
    fn name(&self) -> String;

    /// Current lock state. Must be re-read every tick: engagement is a
    /// mechanical process that completes on its own time.
    fn lock_state(&self) -> LockState;

    /// Command the lock to engage. Only effective while `Lockable`.
    fn lock(&mut self);

    /// Command the lock to release.
    fn unlock(&mut self);
}

/// A rigid merge bridge.
pub trait MergeBlock {
    /// The merge block's configured name.
    fn name(&self) -> String;

    /// Enable or disable the merge field.
    fn set_enabled(&mut self, enabled: bool);

    /// True if the merge field is enabled.
    fn is_enabled(&self) -> bool;

    /// True once the bridge has mechanically connected to its counterpart.
    /// Always false while disabled.
    fn is_connected(&self) -> bool;
}
