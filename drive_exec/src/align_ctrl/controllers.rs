//! # Alignment controllers module
//!
//! This module provides the PID controller used for heading and pose holding.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use util::maths::wrap_to_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// If true errors are treated as angles and wrapped into [-pi, pi)
    continuous: bool,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            continuous: false,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Create a new controller whose input wraps around at +/- pi.
    pub fn new_continuous(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            continuous: true,
            ..Self::new(k_p, k_i, k_d)
        }
    }

    pub fn set_p(&mut self, k_p: f64) {
        self.k_p = k_p;
    }

    pub fn set_i(&mut self, k_i: f64) {
        self.k_i = k_i;
    }

    pub fn set_d(&mut self, k_d: f64) {
        self.k_d = k_d;
    }

    pub fn set_gains(&mut self, k_p: f64, k_i: f64, k_d: f64) {
        self.k_p = k_p;
        self.k_i = k_i;
        self.k_d = k_d;
    }

    pub fn k_p(&self) -> f64 {
        self.k_p
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    /// The error between a measurement and a setpoint, wrapped if the
    /// controller is continuous.
    pub fn position_error(&self, measurement: f64, setpoint: f64) -> f64 {
        let error = setpoint - measurement;
        if self.continuous {
            wrap_to_pi(error)
        }
        else {
            error
        }
    }

    /// Get the value of the controller driving `measurement` to `setpoint`
    /// over a step of `dt_s` seconds.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64, dt_s: f64) -> f64 {
        let error = self.position_error(measurement, setpoint);
        self.get(error, dt_s)
    }

    /// Get the value of the controller for the given error.
    ///
    /// A non-positive `dt_s` contributes no integral or derivative, as a
    /// zero step would otherwise produce a large spike.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        let dt = if dt_s > 0f64 { Some(dt_s) } else { None };

        // Accumulate the integral term.
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64
        };

        // Calculate the derivative, assumed zero on the first call.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => {
                let diff = if self.continuous {
                    wrap_to_pi(error - e)
                }
                else {
                    error - e
                };
                diff / t
            },
            _ => 0f64
        };

        let out =
            self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv;

        self.prev_error = Some(error);

        out
    }
}
