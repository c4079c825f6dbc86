//! Tool head equipment interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared handle to a tool head.
pub type ToolHeadHandle = Rc<RefCell<dyn ToolHead>>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kind of tool mounted on the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    Drill,
    Welder,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The powered tool carried by the arm.
pub trait ToolHead {
    /// The tool's configured name.
    fn name(&self) -> String;

    /// The kind of tool.
    fn kind(&self) -> ToolKind;

    /// Power the tool on or off.
    fn set_enabled(&mut self, enabled: bool);

    /// True if the tool is powered.
    fn is_enabled(&self) -> bool;
}
