//! Parameters structure for the navigation bridge

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;

use super::NavConstraints;
use crate::loc::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Limits used for every task.
    pub constraints: NavConstraints,

    /// Distance within which the platform is at the requested pose.
    ///
    /// Units: meters
    pub translation_tolerance_m: f64,

    /// Heading difference within which the platform is at the requested pose.
    ///
    /// Units: radians
    pub rotation_tolerance_rad: f64,

    /// Named path driven by the speaker shortcut.
    pub speaker_path: String,

    /// Named path driven by the source shortcut.
    pub source_path: String,

    /// Climb stations for each alliance.
    pub endgame: EndgameParams,

    /// Settings for the built-in pursuit service.
    pub pursuit: PursuitParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndgameParams {
    pub blue: Vec<EndgameStation>,
    pub red: Vec<EndgameStation>,
}

/// A climb station, the path which reaches it and where it is.
#[derive(Debug, Clone, Deserialize)]
pub struct EndgameStation {
    pub path: String,

    /// `[x_m, y_m, heading_rad]`
    pub pose: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PursuitParams {
    /// Worker update period.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Proportional gain on position error.
    pub k_p_trans: f64,

    /// Proportional gain on heading error.
    pub k_p_rot: f64,

    /// Distance at which a waypoint is reached.
    ///
    /// Units: meters
    pub waypoint_tolerance_m: f64,

    /// Heading difference at which the final waypoint is reached.
    ///
    /// Units: radians
    pub waypoint_tolerance_rad: f64,

    /// Length of the field, used to mirror paths for red.
    ///
    /// Units: meters
    pub field_length_m: f64,

    /// Named paths as lists of `[x_m, y_m, heading_rad]` waypoints on the
    /// blue half of the field.
    pub named_paths: HashMap<String, Vec<[f64; 3]>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EndgameStation {
    pub fn new(path: &str, pose: [f64; 3]) -> Self {
        Self {
            path: path.into(),
            pose,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.pose[0], self.pose[1], self.pose[2])
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            constraints: NavConstraints::default(),
            translation_tolerance_m: 0.1,
            rotation_tolerance_rad: 0.05,
            speaker_path: "speaker".into(),
            source_path: "shopSource".into(),
            endgame: EndgameParams::default(),
            pursuit: PursuitParams::default(),
        }
    }
}

impl Default for EndgameParams {
    fn default() -> Self {
        Self {
            blue: vec![
                EndgameStation::new("leftEndgame", [4.64, 4.46, (-60f64).to_radians()]),
                EndgameStation::new("rightEndgame", [4.67, 3.72, 60f64.to_radians()]),
                EndgameStation::new("farEndgame", [5.35, 4.11, 180f64.to_radians()]),
            ],
            red: vec![
                EndgameStation::new("leftEndgame", [11.9, 4.49, (-120f64).to_radians()]),
                EndgameStation::new("rightEndgame", [11.93, 3.72, 120f64.to_radians()]),
                EndgameStation::new("farEndgame", [11.22, 4.08, 0.0]),
            ],
        }
    }
}

impl Default for PursuitParams {
    fn default() -> Self {
        let mut named_paths = HashMap::new();
        named_paths.insert("speaker".into(), vec![[1.9, 5.55, std::f64::consts::PI]]);
        named_paths.insert("shopSource".into(), vec![[8.0, 1.5, 0.0], [15.0, 1.0, -1.0472]]);
        named_paths.insert("leftEndgame".into(), vec![[4.64, 4.46, -1.0472]]);
        named_paths.insert("rightEndgame".into(), vec![[4.67, 3.72, 1.0472]]);
        named_paths.insert("farEndgame".into(), vec![[5.35, 4.11, std::f64::consts::PI]]);

        Self {
            period_s: 0.01,
            k_p_trans: 2.0,
            k_p_rot: 3.0,
            waypoint_tolerance_m: 0.02,
            waypoint_tolerance_rad: 0.02,
            field_length_m: 16.54,
            named_paths,
        }
    }
}
