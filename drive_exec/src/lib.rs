//! # Drive library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to
//! access items defined inside the drive crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Alignment control module - decides the chassis velocity command each cycle
pub mod align_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Drive client - the boundary demands are sent across
pub mod drive_client;

/// Localisation interface - the pose type and its producers
pub mod loc;

/// Navigation bridge - starts, debounces and cancels navigation tasks
pub mod nav_bridge;

/// Simulation - physics model and fixed-period integrator thread
#[cfg(feature = "sim")]
pub mod sim;

/// Parameters for the executable itself
pub mod params;
