//! Equipment trait definitions
//!
//! Everything the arm control core needs from the plant, and nothing more.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod actuator;
pub mod connector;
pub mod health;
pub mod stock;
pub mod tool;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use actuator::{ActuatorHandle, LinearActuator};
pub use connector::{Connector, ConnectorHandle, LockState, MergeBlock, MergeBlockHandle};
pub use health::{ElementHealth, HealthMonitor, StructuralReport};
pub use stock::{StockLevel, StockMonitor, StockState};
pub use tool::{ToolHead, ToolHeadHandle, ToolKind};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Registry of all discoverable equipment on the plant.
///
/// This is the scan surface the arm builder works from: every piece of
/// equipment, addressed by its configured name, the way a terminal system
/// would enumerate blocks.
#[derive(Default, Clone)]
pub struct EqptRegistry {
    pub actuators: Vec<ActuatorHandle>,
    pub connectors: Vec<ConnectorHandle>,
    pub merge_blocks: Vec<MergeBlockHandle>,
    pub tool_heads: Vec<ToolHeadHandle>,
}
