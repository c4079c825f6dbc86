//! # Arm control library
//!
//! Motion-control layer for a composite telescoping arm: chained linear
//! actuators (with lockstep parallel groups and polarity-reversed mounts),
//! self-relocating crawl segments, the three-axis arm aggregate, the
//! boustrophedon raster planner, and the tool controller that gates it all
//! on feed-stock level and structural health.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm;
pub mod crawl;
pub mod data_store;
pub mod motion;
pub mod params;
pub mod raster;
pub mod tool_ctrl;
