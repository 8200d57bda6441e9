//! # Drive client
//!
//! The drive boundary. Exactly one demand is applied per control cycle, module
//! kinematics and motor control happen on the far side.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
use log::trace;
#[cfg(feature = "sim")]
use std::sync::Arc;

use comms_if::eqpt::drive::DriveDemand;
#[cfg(feature = "sim")]
use crate::sim::SharedSetpoints;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A sink for drive demands.
pub trait DriveClient {
    fn apply(&mut self, demand: &DriveDemand) -> Result<(), DriveClientError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive client publishing demands to the simulation.
#[cfg(feature = "sim")]
pub struct SimDriveClient {
    setpoints: Arc<SharedSetpoints>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DriveClientError {
    #[error("Demand contains a non-finite value: {0:?}")]
    NonFiniteDemand(DriveDemand),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that every value in the demand is finite.
pub fn check_demand(demand: &DriveDemand) -> Result<(), DriveClientError> {
    let finite = match demand {
        DriveDemand::Velocity(c) => {
            c.vx_ms.is_finite() && c.vy_ms.is_finite() && c.omega_rads.is_finite()
        },
        DriveDemand::CharacterizeDrive { volts }
        | DriveDemand::CharacterizeRotation { volts } => volts.is_finite(),
    };

    if finite {
        Ok(())
    }
    else {
        Err(DriveClientError::NonFiniteDemand(*demand))
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
impl SimDriveClient {
    pub fn new(setpoints: Arc<SharedSetpoints>) -> Self {
        Self { setpoints }
    }
}

#[cfg(feature = "sim")]
impl DriveClient for SimDriveClient {
    fn apply(&mut self, demand: &DriveDemand) -> Result<(), DriveClientError> {
        check_demand(demand)?;
        trace!("Applying {:?}", demand);
        self.setpoints.publish(demand);
        Ok(())
    }
}
