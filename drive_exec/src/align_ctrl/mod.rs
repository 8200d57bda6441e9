//! # Alignment control module
//!
//! Alignment control decides, once per control cycle, the chassis velocity
//! command issued to the drive boundary. It owns the `AlignState` and
//! `AlignTarget` set by the command layer and arbitrates between:
//!
//! - `Manual`: the goal velocity passes straight through.
//! - `Aligning`: translation passes through but rotation is replaced by a
//!   heading lock on a resolved target heading. The heading loop's proportional
//!   gain is scheduled on the size of the heading error (see `gain_sched`),
//!   except in autonomous where fixed gains are used.
//! - `PoseTarget`: all three axes are driven onto an exact pose.
//! - `CharacterizeDrive`/`CharacterizeRotation`: raw tuning voltages for
//!   system identification.
//!
//! Target headings are resolved from a table keyed on target and alliance
//! (`heading_map`). The speaker target is special in that it is resolved by
//! the intercept resolver (`intercept`), which leads the aim to account for the
//! platform's own velocity while the game piece is in flight.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod gain_sched;
pub mod heading_map;
pub mod intercept;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::PidController;
pub use gain_sched::GainSchedule;
pub use heading_map::{HeadingMap, HeadingSource};
pub use intercept::{InterceptModel, InterceptModelError, InterceptResolver, InterceptSolution};
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Heading error at and above which the scheduled gain saturates at its
/// maximum.
///
/// Units: radians
pub const GAIN_SATURATION_ERROR_RAD: f64 = std::f64::consts::FRAC_PI_4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during AlignCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum AlignCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid time of flight table: {0}")]
    InterceptModelError(InterceptModelError),

    #[error("Non-finite value in cycle input: {0}")]
    NonFiniteInput(&'static str),
}
