//! # Mechanism interface library
//!
//! This crate defines the seam between the arm control software and the
//! physical equipment it drives: linear actuators, lockable connectors,
//! merge blocks, tool heads, and the read-only resource/health collaborators.
//!
//! The control loop is single threaded and cooperative, so equipment handles
//! are `Rc<RefCell<dyn Trait>>` aliases: the simulation (and the tests) keep
//! hold of the same equipment instances the control layer commands, exactly
//! as a real plant would be shared between the driver and the world.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod eqpt;
pub mod sim;
