//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Pose and velocity acquisition
//!         - Telecommand processing and handling
//!         - Navigation task polling
//!         - Alignment control processing
//!         - Drive demand output
//!
//! # Modules
//!
//! All cyclic modules (e.g. `align_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!     2. Never block inside `proc`.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
use drive_lib::{
    drive_client::SimDriveClient,
    sim::{self, SharedSetpoints, SimChassis, SimIntegrator},
};
use drive_lib::{
    data_store::DataStore,
    drive_client::DriveClient,
    loc::PoseSource,
    nav_bridge::{self, pursuit::PursuitNavService, NavBridge},
    params::DriveExecParams,
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use std::{
    env,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

// Internal
use comms_if::eqpt::drive::DriveDemand;
use util::{
    logger::logger_init,
    module::State,
    raise_error,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "drive_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Exec params are needed for the log level
    let exec_params: DriveExecParams = util::params::load("drive_exec.toml")
        .wrap_err("Could not load exec params")?;

    // Initialise logger
    logger_init(exec_params.log_level(), &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Swerve Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "Cycle period must be positive, got {}", exec_params.cycle_period_s
        ));
    }
    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;

    // ---- LOAD PARAMETERS ----

    let nav_params: nav_bridge::Params = util::params::load("nav_bridge.toml")
        .wrap_err("Could not load nav bridge params")?;

    #[cfg(feature = "sim")]
    let sim_params: sim::Params = util::params::load("sim.toml")
        .wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument (the TC script path), found {}", args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script = ScriptInterpreter::new(&args[1])
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.align_ctrl.init("align_ctrl.toml", &session)
        .wrap_err("Failed to initialise AlignCtrl")?;
    info!("AlignCtrl init complete");

    // ---- INITIALISE DRIVE BOUNDARY ----

    #[cfg(feature = "sim")]
    let (pose_source, mut drive_client, mut sim_integrator) = {
        let chassis = Arc::new(SimChassis::new(sim_params.chassis.clone()));
        let setpoints = Arc::new(SharedSetpoints::new());

        let integrator = SimIntegrator::start(&sim_params, chassis.clone(), setpoints.clone())
            .wrap_err("Failed to start the sim integrator")?;

        let pose_source: Arc<dyn PoseSource> = chassis;
        let client: Box<dyn DriveClient> = Box::new(SimDriveClient::new(setpoints));

        info!("Simulation initialised");
        (pose_source, client, integrator)
    };

    #[cfg(not(feature = "sim"))]
    let (pose_source, mut drive_client): (Arc<dyn PoseSource>, Box<dyn DriveClient>) =
        return Err(eyre!("No drive boundary is available, build with the \"sim\" feature"));

    let mut nav = NavBridge::new(
        nav_params.clone(),
        PursuitNavService::new(nav_params.pursuit, pose_source.clone())
    );
    info!("NavBridge init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz);

        // ---- DATA INPUT ----

        ds.pose = pose_source.pose();
        ds.velocity_ms = pose_source.velocity();

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, &mut nav, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break
            }
        }

        // ---- NAVIGATION ----

        ds.nav_demand = nav.poll();

        // ---- CONTROL ALGORITHM PROCESSING ----

        let align_ctrl_input = ds.align_ctrl_input();
        match ds.align_ctrl.proc(&align_ctrl_input) {
            Ok((o, r)) => {
                ds.align_ctrl_output = o;
                ds.align_ctrl_status_rpt = r;
            },
            Err(e) => {
                // Output stays at stop for this cycle
                warn!("Error during AlignCtrl processing: {}", e)
            }
        };

        // ---- DRIVE OUTPUT ----

        if let Err(e) = drive_client.apply(&ds.drive_demand()) {
            warn!("Drive client rejected the demand: {}", e);
            drive_client.apply(&DriveDemand::stop()).ok();
        }

        if ds.is_1_hz_cycle {
            let at_pose = ds.pose.map(|p| nav.at_pathfind_pose(&p)).unwrap_or(false);
            info!(
                "{:?} {:?}/{:?}, aligned: {}, nav active: {}, at nav pose: {}",
                ds.robot_mode,
                ds.align_ctrl.get_align_state(),
                ds.align_ctrl.get_align_target(),
                ds.align_ctrl.is_aligned(),
                nav.is_active(),
                at_pose
            );

            match serde_json::to_string(&ds.align_ctrl_status_rpt) {
                Ok(s) => debug!("AlignCtrl status: {}", s),
                Err(e) => warn!("Could not serialise AlignCtrl status: {}", e)
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;

                let limit = exec_params.max_consec_cycle_overruns;
                if limit > 0 && ds.num_consec_cycle_overruns > limit {
                    raise_error!("More than {} consecutive cycle overruns", limit);
                }
            }
        }

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    nav.stop();
    drive_client.apply(&DriveDemand::stop())
        .wrap_err("Could not stop the drive")?;

    #[cfg(feature = "sim")]
    sim_integrator.stop().wrap_err("Failed to stop the sim integrator")?;

    info!("End of execution");

    Ok(())
}
