//! # Data Store

use log::info;
use nalgebra::Vector2;

use crate::{align_ctrl, loc::Pose};
use comms_if::{
    eqpt::drive::{ChassisVelCmd, DriveDemand},
    tc::drive::{Alliance, RobotMode},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub sim_time_s: f64,

    /// Time since the start of the previous cycle.
    pub cycle_dt_s: f64,

    // Mode
    pub robot_mode: RobotMode,
    pub alliance: Alliance,

    // Localisation
    pub pose: Option<Pose>,
    pub velocity_ms: Vector2<f64>,

    /// The operator or autonomous goal, persists between cycles.
    pub goal_demand: ChassisVelCmd,

    /// Demand from an active navigation task, cleared every cycle.
    pub nav_demand: Option<ChassisVelCmd>,

    // AlignCtrl
    pub align_ctrl: align_ctrl::AlignCtrl,
    pub align_ctrl_output: DriveDemand,
    pub align_ctrl_status_rpt: align_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.nav_demand = None;
        self.align_ctrl_output = DriveDemand::stop();
        self.align_ctrl_status_rpt = align_ctrl::StatusReport::default();

        self.advance_time(util::session::get_elapsed_seconds());
    }

    /// Record the cycle start time. The first cycle has no previous cycle to
    /// measure from so its dt is zero.
    fn advance_time(&mut self, now_s: f64) {
        self.cycle_dt_s = match self.num_cycles {
            0 => 0.0,
            _ => now_s - self.sim_time_s
        };
        self.sim_time_s = now_s;
    }

    /// Switch robot mode, updating alignment control and the goal demand.
    pub fn enter_mode(&mut self, mode: RobotMode) {
        if mode != self.robot_mode {
            info!("Robot mode {:?} -> {:?}", self.robot_mode, mode);
        }
        self.robot_mode = mode;

        if let Some(goal) = self.align_ctrl.enter_mode(mode) {
            self.goal_demand = goal;
        }
    }

    /// The demand alignment control should track this cycle, navigation
    /// taking priority over the goal.
    pub fn active_demand(&self) -> ChassisVelCmd {
        self.nav_demand.unwrap_or(self.goal_demand)
    }

    /// Input to alignment control for this cycle.
    pub fn align_ctrl_input(&self) -> align_ctrl::InputData {
        align_ctrl::InputData {
            pose: self.pose.unwrap_or_default(),
            velocity_ms: self.velocity_ms,
            alliance: self.alliance,
            demand: self.active_demand(),
            dt_s: self.cycle_dt_s,
        }
    }

    /// The demand to send to the drive this cycle.
    pub fn drive_demand(&self) -> DriveDemand {
        match self.robot_mode {
            RobotMode::Disabled => DriveDemand::stop(),
            _ => self.align_ctrl_output,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::drive::AlignState;

    #[test]
    fn test_teleop_zeroes_goal() {
        let mut ds = DataStore::default();
        ds.goal_demand = ChassisVelCmd::new(1.0, 1.0, 1.0, true);
        ds.enter_mode(RobotMode::Teleop);
        assert!(ds.goal_demand.is_zero());
        assert!(!ds.goal_demand.field_relative);
        assert_eq!(ds.align_ctrl.get_align_state(), AlignState::Manual);
    }

    #[test]
    fn test_nav_overrides_goal() {
        let mut ds = DataStore::default();
        ds.goal_demand = ChassisVelCmd::new(1.0, 0.0, 0.0, true);
        assert_eq!(ds.active_demand(), ds.goal_demand);
        ds.nav_demand = Some(ChassisVelCmd::new(0.0, 2.0, 0.0, true));
        assert_eq!(ds.align_ctrl_input().demand.vy_ms, 2.0);
    }

    #[test]
    fn test_first_cycle_has_zero_dt() {
        let mut ds = DataStore::default();

        // Startup time before the loop must not reach the controllers
        ds.advance_time(3.5);
        assert_eq!(ds.cycle_dt_s, 0.0);
        assert_eq!(ds.align_ctrl_input().dt_s, 0.0);

        ds.num_cycles += 1;
        ds.advance_time(3.52);
        assert!((ds.cycle_dt_s - 0.02).abs() < 1e-9);
        assert_eq!(ds.sim_time_s, 3.52);
    }

    #[test]
    fn test_disabled_sends_stop() {
        let mut ds = DataStore::default();
        ds.align_ctrl_output = DriveDemand::Velocity(ChassisVelCmd::new(1.0, 0.0, 0.0, true));
        assert_eq!(ds.drive_demand(), DriveDemand::stop());
        ds.enter_mode(RobotMode::Autonomous);
        assert_eq!(ds.drive_demand(), ds.align_ctrl_output);
    }
}
