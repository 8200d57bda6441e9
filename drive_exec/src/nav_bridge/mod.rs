//! # Path navigation bridge
//!
//! Bridges the control loop and an asynchronous navigation service. The
//! bridge starts, debounces and cancels navigation tasks, and answers whether
//! the platform has reached the last requested pose. Tasks run on their own
//! and are only ever polled from the loop, the bridge never waits on them.
//!
//! While a task is active its velocity demand replaces the goal demand for the
//! cycle, so `AlignState::Manual` drives it straight through and
//! `AlignState::Aligning` still holds heading on top of it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
pub mod pursuit;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::loc::Pose;
use comms_if::{eqpt::drive::ChassisVelCmd, tc::drive::Alliance};

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic limits applied to every navigation task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavConstraints {
    /// Units: meters/second
    pub max_vel_ms: f64,

    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Units: radians/second
    pub max_ang_vel_rads: f64,

    /// Units: radians/second^2
    pub max_ang_accel_radss: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A service able to drive the platform along a path asynchronously.
pub trait NavService {
    /// Start a point-to-point task ending at `target`.
    fn start_path_to(
        &mut self,
        target: &Pose,
        constraints: &NavConstraints
    ) -> Result<Box<dyn TaskHandle>, NavServiceError>;

    /// Start a task which first reaches then follows the path called `name`.
    fn start_named_path(
        &mut self,
        name: &str,
        constraints: &NavConstraints
    ) -> Result<Box<dyn TaskHandle>, NavServiceError>;

    /// Inform the service of the alliance so that named paths can be
    /// mirrored onto the correct half of the field.
    fn set_alliance(&mut self, _alliance: Alliance) {}
}

/// Handle to a running navigation task.
pub trait TaskHandle: Send {
    /// True while the task is still running. A finished, failed or cancelled
    /// task is never active again.
    fn is_active(&self) -> bool;

    /// Stop the task. Cancelling an inactive task does nothing.
    fn cancel(&mut self);

    /// The latest velocity demand from the task, if it has one.
    fn demand(&self) -> Option<ChassisVelCmd>;

    /// The final pose of the task, if known.
    fn goal(&self) -> Option<Pose>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavServiceError {
    #[error("No path named \"{0}\" is known")]
    UnknownPath(String),

    #[error("Path \"{0}\" has no waypoints")]
    EmptyPath(String),

    #[error("Could not start the navigation task: {0}")]
    TaskStartError(std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum NavBridgeError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("The navigation service could not start the task: {0}")]
    ServiceError(NavServiceError),

    #[error("No endgame stations are configured for {0:?}")]
    NoEndgameStations(Alliance),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavConstraints {
    fn default() -> Self {
        Self {
            max_vel_ms: 3.0,
            max_accel_mss: 4.0,
            max_ang_vel_rads: 540f64.to_radians(),
            max_ang_accel_radss: 720f64.to_radians(),
        }
    }
}
