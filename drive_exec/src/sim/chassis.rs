//! # Simulated chassis
//!
//! A first-order kinematic model of a swerve chassis. Module dynamics are not
//! modelled, the chassis velocity simply lags the commanded velocity with a
//! fixed time constant. Achievable speed scales with supply voltage.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::{Rotation2, Vector2};
use std::sync::Mutex;

use super::{ChassisParams, DemandKind, PhysicsModel, SetpointSnapshot};
use crate::loc::{Pose, PoseSource};
use util::maths::{clamp, wrap_to_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SimChassis {
    params: ChassisParams,
    state: Mutex<ChassisState>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChassisState {
    pose: Pose,

    /// Field-relative velocity.
    ///
    /// Units: meters/second
    vel_ms: Vector2<f64>,

    /// Units: radians/second
    omega_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimChassis {
    pub fn new(params: ChassisParams) -> Self {
        let p = params.initial_pose;
        Self {
            state: Mutex::new(ChassisState {
                pose: Pose::new(p[0], p[1], p[2]),
                ..Default::default()
            }),
            params,
        }
    }

    /// Place the chassis at the pose, at rest.
    pub fn reset(&self, pose: Pose) {
        if let Ok(mut s) = self.state.lock() {
            *s = ChassisState {
                pose,
                ..Default::default()
            };
        }
    }

    pub fn omega(&self) -> f64 {
        self.state.lock().map(|s| s.omega_rads).unwrap_or(0.0)
    }

    /// Target field velocity and rotation rate for the setpoint.
    fn targets(&self, heading_rad: f64, supply_v: f64, sp: &SetpointSnapshot) -> (Vector2<f64>, f64) {
        let p = &self.params;
        let to_field = Rotation2::new(heading_rad);

        let (vel, omega) = match sp.kind {
            DemandKind::Velocity => {
                let v = Vector2::new(sp.cmd.vx_ms, sp.cmd.vy_ms);
                let v = if sp.cmd.field_relative { v } else { to_field * v };
                (v, sp.cmd.omega_rads)
            },
            DemandKind::CharacterizeDrive => (
                to_field * Vector2::new(sp.volts * p.drive_ms_per_volt, 0.0),
                0.0
            ),
            DemandKind::CharacterizeRotation => (
                Vector2::zeros(),
                sp.volts * p.rot_rads_per_volt
            ),
        };

        // Low supply voltage reduces the achievable speeds
        let v_scale = clamp(&(supply_v / p.nominal_voltage_v), &0.0, &1.0);
        let max_speed = p.max_speed_ms * v_scale;
        let max_omega = p.max_omega_rads * v_scale;

        let vel = if vel.norm() > max_speed {
            vel.normalize() * max_speed
        }
        else {
            vel
        };

        (vel, clamp(&omega, &-max_omega, &max_omega))
    }
}

impl PhysicsModel for SimChassis {
    fn update(&self, dt_s: f64, supply_v: f64, setpoint: &SetpointSnapshot) {
        if !(dt_s > 0.0) || !dt_s.is_finite() {
            return;
        }

        let mut guard = match self.state.lock() {
            Ok(s) => s,
            Err(_) => {
                warn!("Chassis state lock poisoned, skipping update");
                return;
            }
        };

        let s = &mut *guard;
        let (vel_target, omega_target) = self.targets(s.pose.heading_rad, supply_v, setpoint);

        // First order response
        let alpha = if self.params.time_constant_s > 0.0 {
            1.0 - (-dt_s / self.params.time_constant_s).exp()
        }
        else {
            1.0
        };

        s.vel_ms += (vel_target - s.vel_ms) * alpha;
        s.omega_rads += (omega_target - s.omega_rads) * alpha;

        s.pose.position_m += s.vel_ms * dt_s;
        s.pose.heading_rad = wrap_to_pi(s.pose.heading_rad + s.omega_rads * dt_s);
    }
}

impl PoseSource for SimChassis {
    fn pose(&self) -> Option<Pose> {
        self.state.lock().ok().map(|s| s.pose)
    }

    fn velocity(&self) -> Vector2<f64> {
        self.state.lock().map(|s| s.vel_ms).unwrap_or_else(|_| Vector2::zeros())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::drive::ChassisVelCmd;
    use std::f64::consts::FRAC_PI_2;

    fn snapshot(kind: DemandKind, cmd: ChassisVelCmd, volts: f64) -> SetpointSnapshot {
        SetpointSnapshot { kind, cmd, volts }
    }

    fn chassis() -> SimChassis {
        let c = SimChassis::new(ChassisParams::default());
        c.reset(Pose::default());
        c
    }

    #[test]
    fn test_converges_to_field_velocity() {
        let c = chassis();
        let sp = snapshot(DemandKind::Velocity, ChassisVelCmd::new(1.0, 0.5, 0.0, true), 0.0);
        for _ in 0..200 {
            c.update(0.02, 12.0, &sp);
        }
        let v = c.velocity();
        assert!((v[0] - 1.0).abs() < 1e-3);
        assert!((v[1] - 0.5).abs() < 1e-3);
        assert!(c.pose().unwrap().position_m[0] > 3.0);
    }

    #[test]
    fn test_robot_relative_rotated() {
        let c = chassis();
        c.reset(Pose::new(0.0, 0.0, FRAC_PI_2));
        let sp = snapshot(DemandKind::Velocity, ChassisVelCmd::new(1.0, 0.0, 0.0, false), 0.0);
        for _ in 0..200 {
            c.update(0.02, 12.0, &sp);
        }
        let v = c.velocity();
        assert!(v[0].abs() < 1e-3);
        assert!((v[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_low_voltage_limits_speed() {
        let c = chassis();
        let sp = snapshot(DemandKind::Velocity, ChassisVelCmd::new(4.5, 0.0, 0.0, true), 0.0);
        for _ in 0..300 {
            c.update(0.02, 6.0, &sp);
        }
        assert!((c.velocity()[0] - 2.25).abs() < 1e-3);
    }

    #[test]
    fn test_characterize_rotation() {
        let c = chassis();
        let sp = snapshot(DemandKind::CharacterizeRotation, ChassisVelCmd::zero(), 2.0);
        for _ in 0..200 {
            c.update(0.02, 12.0, &sp);
        }
        assert!((c.omega() - 2.0).abs() < 1e-3);
        assert!(c.velocity().norm() < 1e-9);
    }

    #[test]
    fn test_bad_dt_ignored() {
        let c = chassis();
        let sp = snapshot(DemandKind::Velocity, ChassisVelCmd::new(1.0, 0.0, 0.0, true), 0.0);
        c.update(0.0, 12.0, &sp);
        c.update(f64::NAN, 12.0, &sp);
        assert_eq!(c.pose(), Some(Pose::default()));
    }
}
