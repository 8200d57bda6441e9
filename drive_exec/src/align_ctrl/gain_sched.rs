//! # Heading gain scheduler
//!
//! Small heading errors want a gentle proportional gain so the platform does
//! not oscillate about the setpoint, large errors want an aggressive one so it
//! converges quickly. The gain is interpolated linearly between the two on the
//! magnitude of the error, saturating at a quarter turn.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{Params, GAIN_SATURATION_ERROR_RAD};
use util::maths::lerp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tuning of the teleop heading controller.
///
/// `min_p <= max_p` is expected but not enforced, a reversed schedule still
/// produces finite gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSchedule {
    pub min_p: f64,
    pub max_p: f64,
    pub k_i: f64,
    pub k_d: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GainSchedule {
    pub fn new(min_p: f64, max_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { min_p, max_p, k_i, k_d }
    }

    pub fn from_params(params: &Params) -> Self {
        Self::new(
            params.align_min_k_p,
            params.align_max_k_p,
            params.align_k_i,
            params.align_k_d,
        )
    }

    /// Proportional gain to use for the given heading error.
    pub fn k_p(&self, error_rad: f64) -> f64 {
        let t = error_rad.abs() / GAIN_SATURATION_ERROR_RAD;

        // Written so that NaN and infinite errors saturate as well
        if !(t < 1.0) {
            return self.max_p;
        }

        lerp(self.min_p, self.max_p, t)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    fn sched() -> GainSchedule {
        GainSchedule::new(1.0, 5.0, 0.0, 0.0)
    }

    #[test]
    fn test_endpoints() {
        let s = sched();
        assert_eq!(s.k_p(0.0), 1.0);
        assert_eq!(s.k_p(FRAC_PI_4), 5.0);
        assert_eq!(s.k_p(-FRAC_PI_4), 5.0);
        assert_eq!(s.k_p(FRAC_PI_4 / 2.0), 3.0);
    }

    #[test]
    fn test_saturates_beyond_quarter_turn() {
        let s = sched();
        for e in [FRAC_PI_4, 1.0, 2.0, PI, -PI, -1.2, 100.0].iter() {
            assert_eq!(s.k_p(*e), 5.0, "error {}", e);
        }
        assert_eq!(s.k_p(f64::NAN), 5.0);
        assert_eq!(s.k_p(f64::INFINITY), 5.0);
    }

    #[test]
    fn test_monotonic_and_continuous() {
        let s = sched();
        let steps = 1000;
        let mut prev = s.k_p(0.0);
        for i in 1..=steps {
            let e = FRAC_PI_4 * i as f64 / steps as f64;
            let k = s.k_p(e);
            assert!(k >= prev);
            // Each step is one thousandth of the range
            assert!(k - prev < 4.0 / steps as f64 + 1e-9);
            prev = k;
        }
        assert!((prev - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_schedule_is_finite() {
        let s = GainSchedule::new(4.0, 2.0, 0.0, 0.0);
        assert_eq!(s.k_p(0.0), 4.0);
        assert_eq!(s.k_p(1.0), 2.0);
        assert!(s.k_p(0.3).is_finite());
    }
}
