//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::tc::{drive::RobotMode, Tc};
use drive_lib::{
    data_store::DataStore,
    loc::Pose,
    nav_bridge::{NavBridge, NavService},
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore and navigation bridge to send commands to different
/// modules.
pub(crate) fn exec<S: NavService>(ds: &mut DataStore, nav: &mut NavBridge<S>, tc: &Tc) {

    debug!("Executing {:?}", tc);

    // Handle different Tcs
    match tc {
        Tc::EnterMode(m) => {
            if *m == RobotMode::Disabled {
                ds.goal_demand = nav.stop();
            }
            ds.enter_mode(*m);
        },
        Tc::SetAlliance(a) => {
            ds.alliance = *a;
            nav.set_alliance(*a);
        },
        Tc::SetDemo(d) => {
            ds.align_ctrl.set_demo(*d);
            nav.set_demo(*d);
        },
        Tc::SetAlignState(s) => ds.align_ctrl.set_align_state(*s),
        Tc::SetAlignTarget(t) => ds.align_ctrl.set_align_target(*t),
        Tc::SetPoseTarget(p) => ds.align_ctrl.set_pose_target(Pose::from(*p)),
        Tc::SetAlignGains { min_p, max_p, k_i, k_d } => {
            ds.align_ctrl.set_align_gains(*min_p, *max_p, *k_i, *k_d)
        },
        Tc::SetAlignDirection { direction_rad, alliance_specific } => {
            ds.align_ctrl.set_align_direction(*direction_rad, *alliance_specific, ds.alliance)
        },
        Tc::SetTuningSignal(v) => ds.align_ctrl.set_tuning_signal(*v),
        Tc::SetGoalSpeeds(c) => ds.goal_demand = *c,
        Tc::DriveToPose(p) => {
            if let Err(e) = nav.drive_to_pose(Pose::from(*p)) {
                warn!("Could not drive to pose: {}", e);
            }
        },
        Tc::DriveToNamedPath(name) => {
            if let Err(e) = nav.drive_to_named_path(name) {
                warn!("Could not drive path \"{}\": {}", name, e);
            }
        },
        Tc::DriveToSpeaker => {
            if let Err(e) = nav.drive_to_speaker() {
                warn!("Could not drive to the speaker: {}", e);
            }
        },
        Tc::DriveToSource => {
            if let Err(e) = nav.drive_to_source() {
                warn!("Could not drive to the source: {}", e);
            }
        },
        Tc::DriveToEndgame => match ds.pose {
            Some(pose) => {
                if let Err(e) = nav.drive_to_endgame(&pose, ds.alliance) {
                    warn!("Could not drive to endgame: {}", e);
                }
            },
            None => warn!("Cannot pick an endgame station without a pose"),
        },
        Tc::StopNav => ds.goal_demand = nav.stop(),
    }

}
