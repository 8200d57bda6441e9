//! # Heading intercept resolver
//!
//! Resolves the heading the platform should hold to land a game piece in a
//! static target while the platform itself is moving. This is a closed-form
//! feed-forward, recomputed from scratch every cycle:
//!
//! 1. Project the platform forward by `velocity * anticipation_time`, unless the
//!    platform is practically stationary in which case its velocity is treated
//!    as zero.
//! 2. Take the bearing and distance from the projected position to the target.
//! 3. Look up the game piece's time of flight for that distance.
//! 4. The average game piece speed is `distance / time`, and the lead angle
//!    needed to cancel the platform's lateral velocity is
//!    `phi = pi/2 - acos(v_lat / v_piece)`.
//! 5. The heading is the target-to-platform direction turned half a
//!    revolution, so the platform faces the target, minus `phi`.
//!
//! `acos` is only defined for ratios in `[-1, 1]`. When the platform moves
//! laterally faster than the game piece the ratio is clamped, giving the
//! maximum lead of a quarter turn.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::loc::Pose;
use super::Params;
use util::maths::{clamp, lin_map, wrap_to_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distances and times below this are treated as zero.
const MIN_INTERCEPT_EPS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A piecewise-linear map from distance to game piece time of flight.
///
/// Immutable once built. Queries outside the sampled range are clamped to the
/// nearest end sample.
#[derive(Debug, Clone, Default)]
pub struct InterceptModel {
    /// `(distance_m, time_s)` samples sorted by distance.
    samples: Vec<(f64, f64)>,
}

/// Resolves lead-compensated headings to a target.
#[derive(Debug, Clone, Default)]
pub struct InterceptResolver {
    model: InterceptModel,

    /// Units: seconds
    anticipation_time_s: f64,

    /// Units: meters/second
    min_anticipation_vel_ms: f64,
}

/// The result of an intercept resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterceptSolution {
    /// The heading to hold.
    ///
    /// Units: radians, in [-pi, pi)
    pub heading_rad: f64,

    /// The heading which faces straight at the target.
    ///
    /// Units: radians, in [-pi, pi)
    pub bearing_rad: f64,

    /// Units: meters
    pub distance_m: f64,

    /// Units: seconds
    pub time_of_flight_s: f64,

    /// Lead angle subtracted from the bearing.
    ///
    /// Units: radians
    pub lead_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InterceptModelError {
    #[error("The time of flight table contains no samples")]
    NoSamples,

    #[error("Time of flight sample ({0}, {1}) is invalid, distance must be >= 0 and time > 0")]
    InvalidSample(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InterceptModel {

    /// Build the model from `[distance_m, time_s]` samples in any order.
    pub fn new(samples: &[[f64; 2]]) -> Result<Self, InterceptModelError> {
        if samples.is_empty() {
            return Err(InterceptModelError::NoSamples);
        }

        let mut sorted = Vec::with_capacity(samples.len());
        for s in samples {
            if !s[0].is_finite() || !s[1].is_finite() || s[0] < 0.0 || s[1] <= 0.0 {
                return Err(InterceptModelError::InvalidSample(s[0], s[1]));
            }
            sorted.push((s[0], s[1]));
        }

        // All values are finite so partial_cmp cannot fail
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(Self { samples: sorted })
    }

    /// Time of flight to the given distance.
    ///
    /// An empty (default) model returns zero.
    pub fn time_of_flight(&self, distance_m: f64) -> f64 {
        let (first, last) = match (self.samples.first(), self.samples.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return 0.0,
        };

        if !(distance_m > first.0) {
            return first.1;
        }
        if distance_m >= last.0 {
            return last.1;
        }

        // Find the first sample past the distance, the one before it exists
        // since the distance is above the first sample.
        let upper = self.samples.iter().position(|s| s.0 > distance_m).unwrap_or(self.samples.len() - 1);
        let (d0, t0) = self.samples[upper - 1];
        let (d1, t1) = self.samples[upper];

        if d1 - d0 < MIN_INTERCEPT_EPS {
            return t0;
        }

        lin_map((d0, d1), (t0, t1), distance_m)
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }
}

impl InterceptResolver {
    pub fn new(model: InterceptModel, anticipation_time_s: f64, min_anticipation_vel_ms: f64) -> Self {
        Self {
            model,
            anticipation_time_s,
            min_anticipation_vel_ms,
        }
    }

    pub fn from_params(params: &Params) -> Result<Self, InterceptModelError> {
        Ok(Self::new(
            InterceptModel::new(&params.time_of_flight_samples)?,
            params.anticipation_time_s,
            params.min_anticipation_vel_ms,
        ))
    }

    pub fn model(&self) -> &InterceptModel {
        &self.model
    }

    /// Resolve the heading to hold to hit `target_m` from `pose` while moving at
    /// the field-relative `velocity_ms`.
    pub fn resolve(
        &self,
        pose: &Pose,
        target_m: &Vector2<f64>,
        velocity_ms: &Vector2<f64>
    ) -> InterceptSolution {

        // Ignore velocity noise when practically stationary
        let velocity_ms = if velocity_ms.norm() > self.min_anticipation_vel_ms {
            *velocity_ms
        }
        else {
            Vector2::zeros()
        };

        // Anticipated position and the offset from the target to it
        let anticipated_m = pose.position_m + velocity_ms * self.anticipation_time_s;
        let target_to_plat_m = anticipated_m - target_m;
        let distance_m = target_to_plat_m.norm();

        // Face the target
        let bearing_rad = wrap_to_pi(target_to_plat_m[1].atan2(target_to_plat_m[0]) + PI);

        let time_of_flight_s = self.model.time_of_flight(distance_m);

        let lead_rad = if distance_m < MIN_INTERCEPT_EPS || time_of_flight_s < MIN_INTERCEPT_EPS {
            0.0
        }
        else {
            let piece_speed_ms = distance_m / time_of_flight_s;
            let ratio = velocity_ms[1] / piece_speed_ms;

            if ratio.is_finite() {
                FRAC_PI_2 - clamp(&ratio, &-1.0, &1.0).acos()
            }
            else {
                0.0
            }
        };

        let heading_rad = wrap_to_pi(bearing_rad - lead_rad);

        trace!(
            "Intercept: dist {:.3} m, tof {:.3} s, bearing {:.4} rad, lead {:.4} rad",
            distance_m, time_of_flight_s, bearing_rad, lead_rad
        );

        InterceptSolution {
            heading_rad,
            bearing_rad,
            distance_m,
            time_of_flight_s,
            lead_rad,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::ang_dist;

    fn samples() -> Vec<[f64; 2]> {
        vec![[3.0, 0.55], [1.0, 0.25], [6.0, 1.0], [2.0, 0.4]]
    }

    #[test]
    fn test_lookup_interpolates() {
        let m = InterceptModel::new(&samples()).unwrap();
        assert_eq!(m.num_samples(), 4);
        assert!((m.time_of_flight(1.0) - 0.25).abs() < 1e-12);
        assert!((m.time_of_flight(1.5) - 0.325).abs() < 1e-12);
        assert!((m.time_of_flight(4.5) - 0.775).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_clamps() {
        let m = InterceptModel::new(&samples()).unwrap();
        assert_eq!(m.time_of_flight(0.0), 0.25);
        assert_eq!(m.time_of_flight(6.0), 1.0);
        assert_eq!(m.time_of_flight(25.0), 1.0);
        assert_eq!(m.time_of_flight(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_invalid_models() {
        assert!(matches!(InterceptModel::new(&[]), Err(InterceptModelError::NoSamples)));
        assert!(matches!(
            InterceptModel::new(&[[1.0, 0.0]]),
            Err(InterceptModelError::InvalidSample(_, _))
        ));
        assert!(matches!(
            InterceptModel::new(&[[f64::NAN, 1.0]]),
            Err(InterceptModelError::InvalidSample(_, _))
        ));
        assert_eq!(InterceptModel::default().time_of_flight(3.0), 0.0);
    }

    #[test]
    fn test_stationary_heading_is_bearing() {
        let target = Vector2::new(0.0, 5.55);
        let pose = Pose::new(3.0, 4.0, 0.3);

        // Different tables must not change the result when stationary
        let slow = InterceptResolver::new(InterceptModel::new(&samples()).unwrap(), 0.1, 0.05);
        let fast = InterceptResolver::new(InterceptModel::new(&[[1.0, 5.0]]).unwrap(), 0.1, 0.05);

        let a = slow.resolve(&pose, &target, &Vector2::zeros());
        let b = fast.resolve(&pose, &target, &Vector2::zeros());

        let expected = (4.0f64 - 5.55).atan2(3.0) + PI;
        assert!(ang_dist(a.heading_rad, expected).abs() < 1e-12);
        assert!(ang_dist(b.heading_rad, expected).abs() < 1e-12);
        assert_eq!(a.lead_rad, 0.0);
        assert_eq!(a.heading_rad, a.bearing_rad);
    }

    #[test]
    fn test_lateral_velocity_leads() {
        let target = Vector2::new(0.0, 5.55);
        let pose = Pose::new(3.0, 5.55, PI);
        let r = InterceptResolver::new(InterceptModel::new(&samples()).unwrap(), 0.0, 0.05);

        let sol = r.resolve(&pose, &target, &Vector2::new(0.0, 1.0));

        // Piece speed at 3 m is 3 / 0.55 m/s
        let expected_lead = (1.0f64 / (3.0 / 0.55)).asin();
        assert!((sol.lead_rad - expected_lead).abs() < 1e-9);
        assert!(ang_dist(sol.heading_rad, PI - expected_lead).abs() < 1e-9);
    }

    #[test]
    fn test_noise_velocity_ignored() {
        let target = Vector2::new(0.0, 5.55);
        let pose = Pose::new(3.0, 5.55, PI);
        let r = InterceptResolver::new(InterceptModel::new(&samples()).unwrap(), 0.5, 0.05);

        let sol = r.resolve(&pose, &target, &Vector2::new(0.0, 0.04));
        assert_eq!(sol.lead_rad, 0.0);
        assert!((sol.distance_m - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_acos_domain_clamped() {
        let target = Vector2::new(0.0, 5.55);
        let pose = Pose::new(1.0, 5.55, PI);
        let r = InterceptResolver::new(InterceptModel::new(&samples()).unwrap(), 0.0, 0.05);

        // 1 m at 0.25 s is 4 m/s, so 10 m/s lateral is out of acos's domain
        let sol = r.resolve(&pose, &target, &Vector2::new(0.0, 10.0));
        assert!(sol.heading_rad.is_finite());
        assert!((sol.lead_rad - FRAC_PI_2).abs() < 1e-12);

        let sol = r.resolve(&pose, &target, &Vector2::new(0.0, -10.0));
        assert!((sol.lead_rad + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_on_target_is_finite() {
        let target = Vector2::new(2.0, 2.0);
        let pose = Pose::new(2.0, 2.0, 0.0);
        let r = InterceptResolver::new(InterceptModel::new(&samples()).unwrap(), 0.0, 0.05);

        let sol = r.resolve(&pose, &target, &Vector2::new(0.0, 1.0));
        assert!(sol.heading_rad.is_finite());
        assert_eq!(sol.lead_rad, 0.0);
    }
}
