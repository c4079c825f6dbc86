//! Simulated equipment
//!
//! Deterministic in-process implementations of every equipment trait, used
//! by the demo executable and by the test rigs. All physics is explicit: a
//! sim element only changes state when its `step` function is called with a
//! time delta, never from a background thread.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod actuator;
mod connector;
mod crawl_rig;
mod health;
mod stock;
mod tool;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use actuator::SimActuator;
pub use connector::{SimConnector, SimMergeBlock};
pub use crawl_rig::SimCrawlRig;
pub use health::SimHealth;
pub use stock::SimStock;
pub use tool::SimToolHead;
