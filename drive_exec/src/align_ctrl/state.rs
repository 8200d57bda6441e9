//! Implementations for the AlignCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::PI;

// Internal
use super::{
    AlignCtrlError, GainSchedule, HeadingMap, HeadingSource, InterceptModel,
    InterceptResolver, Params, PidController,
};
use crate::loc::Pose;
use comms_if::{
    eqpt::drive::{ChassisVelCmd, DriveDemand},
    tc::drive::{Alliance, AlignState, AlignTarget, RobotMode},
};
use util::{maths::clamp, module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Alignment control module state
pub struct AlignCtrl {
    pub(crate) params: Params,

    state: AlignState,
    target: AlignTarget,
    mode: RobotMode,
    demo: bool,

    schedule: GainSchedule,

    /// Heading controller, shared between `Aligning` and `PoseTarget`.
    theta_ctrl: PidController,
    x_ctrl: PidController,
    y_ctrl: PidController,

    heading_map: HeadingMap,
    resolver: InterceptResolver,

    pose_target: Option<Pose>,

    /// Units: volts
    tuning_volts: f64,

    /// Heading error from the last `Aligning` cycle.
    ///
    /// Units: radians
    align_error_rad: f64,

    /// Desired heading from the last `Aligning` cycle.
    ///
    /// Units: radians
    desired_heading_rad: f64,

    /// Units: radians
    align_direction_rad: f64,

    pub(crate) report: StatusReport,
}

/// Input data to Alignment Control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Current platform pose
    pub pose: Pose,

    /// Field-relative velocity of the platform.
    ///
    /// Units: meters/second
    pub velocity_ms: Vector2<f64>,

    /// Current alliance
    pub alliance: Alliance,

    /// The goal chassis velocity from the operator or autonomous routine.
    pub demand: ChassisVelCmd,

    /// Time since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for AlignCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub desired_heading_rad: f64,
    pub align_error_rad: f64,
    pub rotation_k_p: f64,
    pub aligned: bool,

    /// Set if `PoseTarget` is active but no target pose has been given.
    pub pose_target_missing: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AlignCtrl {
    fn default() -> Self {
        let params = Params::default();
        let resolver = InterceptResolver::new(
            InterceptModel::new(&params.time_of_flight_samples).unwrap_or_default(),
            params.anticipation_time_s,
            params.min_anticipation_vel_ms,
        );
        Self::build(params, resolver)
    }
}

impl AlignCtrl {

    /// Create a new instance from the given parameters.
    pub fn new(params: Params) -> Result<Self, AlignCtrlError> {
        let resolver = InterceptResolver::from_params(&params)
            .map_err(AlignCtrlError::InterceptModelError)?;
        Ok(Self::build(params, resolver))
    }

    fn build(params: Params, resolver: InterceptResolver) -> Self {
        let schedule = GainSchedule::from_params(&params);
        let x = params.pose_x_gains;
        let y = params.pose_y_gains;

        Self {
            state: AlignState::default(),
            target: AlignTarget::default(),
            mode: RobotMode::default(),
            demo: false,
            schedule,
            theta_ctrl: PidController::new_continuous(
                schedule.max_p, schedule.k_i, schedule.k_d
            ),
            x_ctrl: PidController::new(x[0], x[1], x[2]),
            y_ctrl: PidController::new(y[0], y[1], y[2]),
            heading_map: HeadingMap::from_params(&params),
            resolver,
            pose_target: None,
            tuning_volts: 0.0,
            // Not aligned until an aligning cycle says otherwise
            align_error_rad: PI,
            desired_heading_rad: 0.0,
            align_direction_rad: 0.0,
            report: StatusReport::default(),
            params,
        }
    }

    // ---- SETTERS ----

    pub fn set_align_state(&mut self, state: AlignState) {
        if state != self.state {
            debug!("AlignState {:?} -> {:?}", self.state, state);
            self.reset_controllers();
        }
        self.state = state;
    }

    pub fn set_align_target(&mut self, target: AlignTarget) {
        if target != self.target {
            debug!("AlignTarget {:?} -> {:?}", self.target, target);
            self.reset_controllers();
        }
        self.target = target;
    }

    pub fn set_pose_target(&mut self, pose: Pose) {
        debug!("Pose target set to {:?}", pose);
        self.pose_target = Some(pose);
    }

    /// Retune the heading controller. Integral and derivative gains apply
    /// immediately, the proportional gain is rescheduled next cycle.
    pub fn set_align_gains(&mut self, min_p: f64, max_p: f64, k_i: f64, k_d: f64) {
        self.schedule = GainSchedule::new(min_p, max_p, k_i, k_d);
        self.theta_ctrl.set_i(k_i);
        self.theta_ctrl.set_d(k_d);
    }

    /// Set the characterization voltage.
    pub fn set_tuning_signal(&mut self, volts: f64) {
        self.tuning_volts = volts;
    }

    pub fn set_demo(&mut self, demo: bool) {
        if demo != self.demo {
            debug!("Demo mode {}", if demo { "enabled" } else { "disabled" });
        }
        self.demo = demo;
    }

    /// Store a free alignment direction. When `alliance_specific` the
    /// direction is given from blue's side and is mirrored on red.
    pub fn set_align_direction(
        &mut self,
        direction_rad: f64,
        alliance_specific: bool,
        alliance: Alliance
    ) {
        self.align_direction_rad = if alliance_specific && alliance == Alliance::Red {
            util::maths::wrap_to_pi(direction_rad + PI)
        }
        else {
            direction_rad
        };
    }

    /// Switch operating mode.
    ///
    /// Autonomous aims at the speaker with the fixed autonomous gains. Teleop
    /// returns to manual driving with the scheduled gains and returns a zero
    /// robot-relative command which should replace the current goal.
    pub fn enter_mode(&mut self, mode: RobotMode) -> Option<ChassisVelCmd> {
        debug!("AlignCtrl entering {:?}", mode);
        self.mode = mode;
        self.reset_controllers();

        match mode {
            RobotMode::Autonomous => {
                self.theta_ctrl.set_gains(
                    self.params.auto_k_p,
                    self.params.auto_k_i,
                    self.params.auto_k_d
                );
                self.set_align_state(AlignState::Aligning);
                self.set_align_target(AlignTarget::Speaker);
                None
            },
            RobotMode::Teleop => {
                self.theta_ctrl.set_gains(
                    self.schedule.max_p,
                    self.schedule.k_i,
                    self.schedule.k_d
                );
                self.set_align_state(AlignState::Manual);
                Some(ChassisVelCmd::new(0.0, 0.0, 0.0, false))
            },
            RobotMode::Disabled => None
        }
    }

    // ---- GETTERS ----

    pub fn get_align_state(&self) -> AlignState {
        self.state
    }

    pub fn get_align_target(&self) -> AlignTarget {
        self.target
    }

    pub fn get_mode(&self) -> RobotMode {
        self.mode
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn pose_target(&self) -> Option<Pose> {
        self.pose_target
    }

    pub fn tuning_signal(&self) -> f64 {
        self.tuning_volts
    }

    pub fn align_direction(&self) -> f64 {
        self.align_direction_rad
    }

    pub fn align_error(&self) -> f64 {
        self.align_error_rad
    }

    pub fn schedule(&self) -> &GainSchedule {
        &self.schedule
    }

    /// True if the last aligning heading error is within tolerance.
    pub fn is_aligned(&self) -> bool {
        self.align_error_rad.abs() < self.params.align_tolerance_rad
    }

    /// The heading an external path follower should hold instead of its own,
    /// only while aligning.
    pub fn override_rotation(&self) -> Option<f64> {
        match self.state {
            AlignState::Aligning => Some(self.desired_heading_rad),
            _ => None
        }
    }

    // ---- PROCESSING ----

    fn reset_controllers(&mut self) {
        self.theta_ctrl.reset();
        self.x_ctrl.reset();
        self.y_ctrl.reset();
    }

    fn check_input(input: &InputData) -> Result<(), AlignCtrlError> {
        let p = &input.pose;
        if !(p.position_m[0].is_finite() && p.position_m[1].is_finite() && p.heading_rad.is_finite()) {
            return Err(AlignCtrlError::NonFiniteInput("pose"));
        }
        if !(input.velocity_ms[0].is_finite() && input.velocity_ms[1].is_finite()) {
            return Err(AlignCtrlError::NonFiniteInput("velocity"));
        }
        let d = &input.demand;
        if !(d.vx_ms.is_finite() && d.vy_ms.is_finite() && d.omega_rads.is_finite()) {
            return Err(AlignCtrlError::NonFiniteInput("demand"));
        }
        if !input.dt_s.is_finite() {
            return Err(AlignCtrlError::NonFiniteInput("dt"));
        }
        Ok(())
    }

    /// Resolve the heading to hold for the current target.
    fn desired_heading(&self, input: &InputData) -> f64 {
        match self.heading_map.source(self.target, input.alliance) {
            HeadingSource::Fixed(h) => h,
            HeadingSource::Intercept(target_m) => self.resolver
                .resolve(&input.pose, &target_m, &input.velocity_ms)
                .heading_rad,
            HeadingSource::Hold => input.pose.heading_rad
        }
    }

    fn calc_aligning(&mut self, input: &InputData) -> ChassisVelCmd {
        let mut cmd = input.demand;

        if self.demo {
            self.desired_heading_rad = input.pose.heading_rad;
            return cmd;
        }

        let heading_rad = input.pose.heading_rad;
        let desired_rad = self.desired_heading(input);
        let error_rad = self.theta_ctrl.position_error(heading_rad, desired_rad);

        // Autonomous keeps the fixed gains set on entry
        if self.mode != RobotMode::Autonomous {
            self.theta_ctrl.set_p(self.schedule.k_p(error_rad));
        }

        cmd.omega_rads = self.theta_ctrl.calculate(heading_rad, desired_rad, input.dt_s);

        self.desired_heading_rad = desired_rad;
        self.align_error_rad = error_rad;

        trace!(
            "Aligning to {:?}: desired {:.4} rad, error {:.4} rad, k_p {:.3}, omega {:.4} rad/s",
            self.target, desired_rad, error_rad, self.theta_ctrl.k_p(), cmd.omega_rads
        );

        cmd
    }

    fn calc_pose_target(&mut self, input: &InputData) -> ChassisVelCmd {
        let target = match self.pose_target {
            Some(t) => t,
            None => {
                self.report.pose_target_missing = true;
                return ChassisVelCmd::zero();
            }
        };

        let pose = &input.pose;
        let dt = input.dt_s;

        let cmd = ChassisVelCmd::new(
            self.x_ctrl.calculate(pose.position_m[0], target.position_m[0], dt),
            self.y_ctrl.calculate(pose.position_m[1], target.position_m[1], dt),
            self.theta_ctrl.calculate(pose.heading_rad, target.heading_rad, dt),
            true
        );

        trace!("PoseTarget cmd: {:?}", cmd);

        cmd
    }

    fn apply_demo_limits(&self, mut cmd: ChassisVelCmd) -> ChassisVelCmd {
        let max = self.params.demo_max_speed_ms;
        cmd.vx_ms = clamp(&cmd.vx_ms, &0.0, &max);
        cmd.vy_ms = clamp(&cmd.vy_ms, &0.0, &max);
        cmd.omega_rads *= self.params.demo_omega_scale;
        cmd
    }
}

impl State for AlignCtrl {
    type InitData = &'static str;
    type InitError = AlignCtrlError;

    type InputData = InputData;
    type OutputData = DriveDemand;
    type StatusReport = StatusReport;
    type ProcError = AlignCtrlError;

    /// Initialise the AlignCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)
            .map_err(AlignCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        Ok(())
    }

    /// Perform cyclic processing of Alignment Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        if let Err(e) = Self::check_input(input_data) {
            warn!("AlignCtrl rejected cycle input: {}", e);
            return Err(e);
        }

        let output = match self.state {
            AlignState::Manual => DriveDemand::Velocity(input_data.demand),
            AlignState::Aligning => DriveDemand::Velocity(self.calc_aligning(input_data)),
            AlignState::PoseTarget => DriveDemand::Velocity(self.calc_pose_target(input_data)),
            AlignState::CharacterizeDrive => DriveDemand::CharacterizeDrive {
                volts: self.tuning_volts
            },
            AlignState::CharacterizeRotation => DriveDemand::CharacterizeRotation {
                volts: self.tuning_volts
            },
        };

        let output = match output {
            DriveDemand::Velocity(cmd) if self.demo => {
                DriveDemand::Velocity(self.apply_demo_limits(cmd))
            },
            o => o
        };

        self.report.desired_heading_rad = self.desired_heading_rad;
        self.report.align_error_rad = self.align_error_rad;
        self.report.rotation_k_p = self.theta_ctrl.k_p();
        self.report.aligned = self.is_aligned();

        trace!("AlignCtrl output: {:?}", output);

        Ok((output, self.report))
    }
}
