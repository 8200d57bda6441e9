//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications 
//! interface. Telecommands are the only way the command layer (operator input
//! or an autonomous routine) instructs the drive executable.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
use crate::eqpt::drive::ChassisVelCmd;
use self::drive::{AlignState, AlignTarget, Alliance, RobotMode, TcPose};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the drive executable.
///
/// Telecommands are carried as JSON of the form
/// `{"type": "<variant>", "payload": <data>}`, where the payload is omitted for
/// variants which carry no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Switch the platform's operating mode.
    EnterMode(RobotMode),

    /// Report the alliance from the field connection.
    SetAlliance(Alliance),

    /// Enable or disable the restricted demo mode.
    SetDemo(bool),

    SetAlignState(AlignState),

    SetAlignTarget(AlignTarget),

    /// Set the exact pose used by `AlignState::PoseTarget`.
    SetPoseTarget(TcPose),

    /// Retune the heading controller.
    SetAlignGains {
        min_p: f64,
        max_p: f64,
        k_i: f64,
        k_d: f64,
    },

    /// Set a free alignment direction, mirrored for red if `alliance_specific`.
    SetAlignDirection {
        direction_rad: f64,
        alliance_specific: bool,
    },

    /// Set the characterization voltage.
    SetTuningSignal(f64),

    /// Set the goal (manual) chassis speeds.
    SetGoalSpeeds(ChassisVelCmd),

    DriveToPose(TcPose),

    DriveToNamedPath(String),

    DriveToSpeaker,

    DriveToSource,

    DriveToEndgame,

    /// Cancel any navigation and stop.
    StopNav,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise the TC into a JSON packet
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_tcs() {
        assert_eq!(
            Tc::from_json(r#"{"type": "SetAlignTarget", "payload": "Speaker"}"#).unwrap(),
            Tc::SetAlignTarget(AlignTarget::Speaker)
        );
        assert_eq!(
            Tc::from_json(r#"{"type": "DriveToSpeaker"}"#).unwrap(),
            Tc::DriveToSpeaker
        );
        assert_eq!(
            Tc::from_json(
                r#"{"type": "SetAlignGains", "payload": {"min_p": 1.0, "max_p": 6.0, "k_i": 0.0, "k_d": 0.1}}"#
            ).unwrap(),
            Tc::SetAlignGains { min_p: 1.0, max_p: 6.0, k_i: 0.0, k_d: 0.1 }
        );
        assert_eq!(
            Tc::from_json(
                r#"{"type": "DriveToPose", "payload": {"x_m": 2.0, "y_m": 5.5, "heading_rad": 3.14}}"#
            ).unwrap(),
            Tc::DriveToPose(TcPose { x_m: 2.0, y_m: 5.5, heading_rad: 3.14 })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Tc::from_json("not json").is_err());
        assert!(Tc::from_json(r#"{"type": "SetAlignState", "payload": "Hovering"}"#).is_err());
        assert!(Tc::from_json(r#"{"payload": "Manual"}"#).is_err());
    }
}
