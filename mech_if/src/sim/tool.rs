//! Simulated tool head

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;

use crate::eqpt::tool::{ToolHead, ToolKind};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated drill/welder head: a named power switch.
pub struct SimToolHead {
    name: String,
    kind: ToolKind,
    enabled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimToolHead {
    pub fn new(name: &str, kind: ToolKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            enabled: false,
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl ToolHead for SimToolHead {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
