//! # Communications interface crate.
//!
//! Provides all common interfaces between the drive executable and its
//! collaborators: the telecommands which drive it and the demands it sends to
//! the drive hardware boundary.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Demand definitions for equipment (the drive hardware boundary)
pub mod eqpt;
