//! # Localisation interface
//!
//! The drive core does not estimate its own pose. This module defines the pose
//! type it reads each cycle and the producer interface it reads it from.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use comms_if::tc::drive::TcPose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading in the field frame) of the platform.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {

    /// The position in the field frame
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading of the platform, angle from field X+ to the platform's
    /// forward axis, positive anticlockwise.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A producer of the platform's pose and velocity.
///
/// Implementations must never block, they are read from inside the control
/// cycle.
pub trait PoseSource: Send + Sync {
    /// Current pose, or `None` if no estimate is available yet.
    fn pose(&self) -> Option<Pose>;

    /// Current field-relative translational velocity.
    ///
    /// Units: meters/second
    fn velocity(&self) -> Vector2<f64>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// Return the heading (angle to the positive field X axis) in radians.
    pub fn get_heading(&self) -> f64 {
        self.heading_rad
    }

    /// Straight line distance between this pose and another.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (other.position_m - self.position_m).norm()
    }

    /// Shortest signed heading change to go from this pose to another.
    pub fn heading_to(&self, other: &Pose) -> f64 {
        util::maths::ang_dist(self.heading_rad, other.heading_rad)
    }
}

impl From<TcPose> for Pose {
    fn from(p: TcPose) -> Self {
        Pose::new(p.x_m, p.y_m, p.heading_rad)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pose_relations() {
        let a = Pose::new(0.0, 0.0, 3.0);
        let b = Pose::new(3.0, 4.0, -3.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((a.heading_to(&b) - (2.0 * std::f64::consts::PI - 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_from_tc_pose() {
        let p = Pose::from(TcPose { x_m: 1.0, y_m: 2.0, heading_rad: 0.5 });
        assert_eq!(p, Pose::new(1.0, 2.0, 0.5));
        assert_eq!(p.get_heading(), 0.5);
    }
}
