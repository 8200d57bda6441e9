//! Parameters structure for the simulation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Period of the integrator thread.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Simulated battery voltage fed to the physics model.
    ///
    /// Units: volts
    pub supply_voltage_v: f64,

    pub chassis: ChassisParams,
}

/// First-order chassis model parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ChassisParams {
    /// Voltage at which commanded velocities are fully achieved.
    ///
    /// Units: volts
    pub nominal_voltage_v: f64,

    /// Time constant of the velocity response.
    ///
    /// Units: seconds
    pub time_constant_s: f64,

    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Units: radians/second
    pub max_omega_rads: f64,

    /// Steady state forward speed per volt when characterizing translation.
    ///
    /// Units: meters/second/volt
    pub drive_ms_per_volt: f64,

    /// Steady state rotation rate per volt when characterizing rotation.
    ///
    /// Units: radians/second/volt
    pub rot_rads_per_volt: f64,

    /// Pose at startup, `[x_m, y_m, heading_rad]`.
    pub initial_pose: [f64; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            period_s: 0.005,
            supply_voltage_v: 12.0,
            chassis: ChassisParams::default(),
        }
    }
}

impl Default for ChassisParams {
    fn default() -> Self {
        Self {
            nominal_voltage_v: 12.0,
            time_constant_s: 0.1,
            max_speed_ms: 4.5,
            max_omega_rads: 4.0 * std::f64::consts::PI,
            drive_ms_per_volt: 0.4,
            rot_rads_per_volt: 1.0,
            initial_pose: [2.0, 5.55, 0.0],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::DriveExecParams;

    #[test]
    fn test_sim_faster_than_loop() {
        let sim: Params = util::params::from_str(
            include_str!("../../../params/sim.toml")
        ).unwrap();
        let exec: DriveExecParams = util::params::from_str(
            include_str!("../../../params/drive_exec.toml")
        ).unwrap();

        assert!(sim.period_s > 0.0);
        assert!(sim.period_s < exec.cycle_period_s);
        assert!(Params::default().period_s < DriveExecParams::default().cycle_period_s);
    }
}
