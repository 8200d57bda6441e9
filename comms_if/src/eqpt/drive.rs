//! # Drive demands
//!
//! The drive hardware boundary accepts exactly one `DriveDemand` per control
//! cycle. Module-level geometry (steer angles and wheel speeds) is resolved on
//! the far side of this boundary.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A platform-level velocity command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChassisVelCmd {
    /// Forward velocity.
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Leftward velocity.
    ///
    /// Units: meters/second
    pub vy_ms: f64,

    /// Rotation rate, positive anticlockwise about Z+.
    ///
    /// Units: radians/second
    pub omega_rads: f64,

    /// If true `vx_ms` and `vy_ms` are along the field axes, otherwise they are
    /// along the platform's own forward and left axes.
    pub field_relative: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The demand issued to the drive boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveDemand {
    /// Normal closed-loop velocity control.
    Velocity(ChassisVelCmd),

    /// Raw voltage applied to all drive motors with the modules held straight,
    /// used for translation system identification.
    CharacterizeDrive { volts: f64 },

    /// Raw voltage applied to the steer motors, used for rotation system
    /// identification.
    CharacterizeRotation { volts: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ChassisVelCmd {
    pub fn new(vx_ms: f64, vy_ms: f64, omega_rads: f64, field_relative: bool) -> Self {
        Self {
            vx_ms,
            vy_ms,
            omega_rads,
            field_relative,
        }
    }

    /// A field-relative command with every component zero.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, true)
    }

    /// True if every velocity component is zero.
    pub fn is_zero(&self) -> bool {
        self.vx_ms == 0.0 && self.vy_ms == 0.0 && self.omega_rads == 0.0
    }
}

impl Default for ChassisVelCmd {
    fn default() -> Self {
        Self::zero()
    }
}

impl DriveDemand {
    /// A zero velocity demand.
    pub fn stop() -> Self {
        DriveDemand::Velocity(ChassisVelCmd::zero())
    }

    /// The velocity command if this is a velocity demand.
    pub fn velocity(&self) -> Option<&ChassisVelCmd> {
        match self {
            DriveDemand::Velocity(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for DriveDemand {
    fn default() -> Self {
        Self::stop()
    }
}
