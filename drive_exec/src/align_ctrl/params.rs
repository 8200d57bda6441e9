//! Parameters structure for AlignCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::f64::consts::{FRAC_PI_2, PI};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for alignment control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- TELEOP HEADING CONTROLLER ----

    /// Proportional gain used for very small heading errors.
    pub align_min_k_p: f64,

    /// Proportional gain used for heading errors of a quarter turn or more.
    pub align_max_k_p: f64,

    /// Heading controller integral gain.
    pub align_k_i: f64,

    /// Heading controller derivative gain.
    pub align_k_d: f64,

    // ---- AUTONOMOUS HEADING CONTROLLER ----

    /// Fixed proportional gain used in autonomous.
    pub auto_k_p: f64,

    /// Fixed integral gain used in autonomous.
    pub auto_k_i: f64,

    /// Fixed derivative gain used in autonomous.
    pub auto_k_d: f64,

    // ---- POSE TARGET CONTROLLERS ----

    /// Field X controller gains, `[k_p, k_i, k_d]`.
    pub pose_x_gains: [f64; 3],

    /// Field Y controller gains, `[k_p, k_i, k_d]`.
    pub pose_y_gains: [f64; 3],

    // ---- TOLERANCES ----

    /// Heading error under which the platform is considered aligned.
    ///
    /// Units: radians
    pub align_tolerance_rad: f64,

    // ---- INTERCEPT ----

    /// How far ahead the platform's position is projected when aiming.
    ///
    /// Units: seconds
    pub anticipation_time_s: f64,

    /// Platform speeds at or below this are treated as zero when aiming.
    ///
    /// Units: meters/second
    pub min_anticipation_vel_ms: f64,

    /// Game piece time of flight samples as `[distance_m, time_s]` pairs.
    pub time_of_flight_samples: Vec<[f64; 2]>,

    // ---- FIELD ----

    /// Per-alliance headings and target positions.
    pub headings: HeadingParams,

    // ---- DEMO ----

    /// Maximum translation speed on each axis in demo mode.
    ///
    /// Units: meters/second
    pub demo_max_speed_ms: f64,

    /// Scale applied to rotation rate in demo mode.
    pub demo_omega_scale: f64,
}

/// Headings for each alliance.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadingParams {
    pub blue: AllianceHeadings,
    pub red: AllianceHeadings,
}

/// The headings and target positions for a single alliance.
///
/// Units: radians for headings, meters for positions
#[derive(Debug, Clone, Deserialize)]
pub struct AllianceHeadings {
    pub amp_rad: f64,
    pub source_rad: f64,
    pub up_rad: f64,
    pub down_rad: f64,
    pub left_rad: f64,
    pub right_rad: f64,

    /// Position of the speaker opening in the field frame.
    pub speaker_pos_m: [f64; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            align_min_k_p: 1.5,
            align_max_k_p: 6.0,
            align_k_i: 0.0,
            align_k_d: 0.0,
            auto_k_p: 5.0,
            auto_k_i: 0.0,
            auto_k_d: 0.0,
            pose_x_gains: [2.0, 0.0, 0.0],
            pose_y_gains: [2.0, 0.0, 0.0],
            align_tolerance_rad: 0.03,
            anticipation_time_s: 0.01,
            min_anticipation_vel_ms: 0.01,
            time_of_flight_samples: vec![
                [1.0, 0.25],
                [2.0, 0.40],
                [3.0, 0.55],
                [4.0, 0.70],
                [5.0, 0.85],
                [6.0, 1.00],
            ],
            headings: HeadingParams::default(),
            demo_max_speed_ms: 1.0,
            demo_omega_scale: 0.5,
        }
    }
}

impl Default for HeadingParams {
    fn default() -> Self {
        Self {
            blue: AllianceHeadings {
                amp_rad: FRAC_PI_2,
                source_rad: -PI / 3.0,
                up_rad: 0.0,
                down_rad: PI,
                left_rad: FRAC_PI_2,
                right_rad: -FRAC_PI_2,
                speaker_pos_m: [0.0, 5.55],
            },
            red: AllianceHeadings {
                amp_rad: FRAC_PI_2,
                source_rad: -2.0 * PI / 3.0,
                up_rad: PI,
                down_rad: 0.0,
                left_rad: -FRAC_PI_2,
                right_rad: FRAC_PI_2,
                speaker_pos_m: [16.54, 5.55],
            },
        }
    }
}
