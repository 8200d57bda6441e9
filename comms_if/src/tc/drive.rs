//! # Drive telecommand types
//!
//! Enumerations shared between the telecommand layer and the drive executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The alignment state of the drivetrain. Exactly one is active at a time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignState {
    /// Operator/autonomous velocities pass straight through.
    Manual,
    /// Rotation is replaced by a heading lock on the current `AlignTarget`.
    Aligning,
    /// Translation and rotation are driven onto an exact target pose.
    PoseTarget,
    /// Raw translation voltage for system identification.
    CharacterizeDrive,
    /// Raw rotation voltage for system identification.
    CharacterizeRotation,
}

/// Symbolic alignment targets, only meaningful while `Aligning`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignTarget {
    None,
    Amp,
    Speaker,
    Source,
    Endgame,
    Up,
    Down,
    Left,
    Right,
}

/// The alliance the platform is playing for.
///
/// `Unknown` is a normal state before the field connection is made.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alliance {
    Blue,
    Red,
    Unknown,
}

/// Operating mode of the whole platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Teleop,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A field pose as carried in telecommands.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcPose {
    pub x_m: f64,
    pub y_m: f64,
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AlignState {
    fn default() -> Self {
        AlignState::Manual
    }
}

impl Default for AlignTarget {
    fn default() -> Self {
        AlignTarget::None
    }
}

impl Default for Alliance {
    fn default() -> Self {
        Alliance::Unknown
    }
}

impl Default for RobotMode {
    fn default() -> Self {
        RobotMode::Disabled
    }
}

impl Alliance {
    /// The alliance whose field tables should be used. `Unknown` falls back to
    /// `Blue`.
    pub fn effective(self) -> Self {
        match self {
            Alliance::Red => Alliance::Red,
            Alliance::Blue | Alliance::Unknown => Alliance::Blue,
        }
    }
}
