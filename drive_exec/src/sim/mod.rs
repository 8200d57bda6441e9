//! # Simulation module
//!
//! When running without hardware the platform is simulated by a physics model
//! advanced on its own fixed-period thread. Each tick the integrator measures
//! the wall time since the previous tick, reads the latest setpoints published
//! by the control loop and steps the model with that delta and a simulated
//! supply voltage.
//!
//! The control loop and the integrator share only the `SharedSetpoints`, plus
//! the model itself which the loop reads its pose from.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chassis;
mod params;
mod setpoints;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

pub use chassis::SimChassis;
pub use params::*;
pub use setpoints::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A physics model which can be stepped forward in time.
pub trait PhysicsModel: Send + Sync {
    /// Advance the model by `dt_s` seconds with the given supply voltage and
    /// setpoints.
    fn update(&self, dt_s: f64, supply_v: f64, setpoint: &SetpointSnapshot);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fixed-period simulation integrator thread.
pub struct SimIntegrator {
    run: Arc<AtomicBool>,
    num_ticks: Arc<AtomicU64>,
    jh: Option<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Integrator period must be positive and finite, got {0}")]
    InvalidPeriod(f64),

    #[error("Could not start the integrator thread: {0}")]
    SpawnError(std::io::Error),

    #[error("The integrator thread panicked")]
    ThreadPanicked,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimIntegrator {

    /// Start the integrator thread.
    pub fn start(
        params: &Params,
        model: Arc<dyn PhysicsModel>,
        setpoints: Arc<SharedSetpoints>
    ) -> Result<Self, SimError> {
        if !(params.period_s > 0.0) || !params.period_s.is_finite() {
            return Err(SimError::InvalidPeriod(params.period_s));
        }

        let period = Duration::from_secs_f64(params.period_s);
        let supply_v = params.supply_voltage_v;

        let run = Arc::new(AtomicBool::new(true));
        let num_ticks = Arc::new(AtomicU64::new(0));

        let run_thread = run.clone();
        let ticks_thread = num_ticks.clone();

        let jh = thread::Builder::new()
            .name("sim::integrator".into())
            .spawn(move || {
                let mut last = Instant::now();

                while run_thread.load(Ordering::SeqCst) {
                    // Sleep the remainder of the period
                    if let Some(d) = period.checked_sub(last.elapsed()) {
                        thread::sleep(d);
                    }

                    let now = Instant::now();
                    let dt_s = (now - last).as_secs_f64();
                    last = now;

                    let sp = setpoints.read();
                    model.update(dt_s, supply_v, &sp);

                    let n = ticks_thread.fetch_add(1, Ordering::SeqCst);
                    trace!("Sim tick {}: dt {:.5} s, {:?}", n, dt_s, sp);
                }

                debug!("Sim integrator stopped");
            })
            .map_err(SimError::SpawnError)?;

        info!("Sim integrator started with a {:.3} s period", params.period_s);

        Ok(Self {
            run,
            num_ticks,
            jh: Some(jh),
        })
    }

    /// Number of times the model has been stepped.
    pub fn num_ticks(&self) -> u64 {
        self.num_ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.jh.is_some() && self.run.load(Ordering::SeqCst)
    }

    /// Stop the thread and wait for it to finish.
    pub fn stop(&mut self) -> Result<(), SimError> {
        self.run.store(false, Ordering::SeqCst);
        match self.jh.take() {
            Some(jh) => jh.join().map_err(|_| SimError::ThreadPanicked),
            None => Ok(())
        }
    }
}

impl Drop for SimIntegrator {
    fn drop(&mut self) {
        self.stop().ok();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::drive::{ChassisVelCmd, DriveDemand};
    use std::sync::Mutex;

    /// Records every update it is given.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(f64, f64, SetpointSnapshot)>>,
    }

    impl PhysicsModel for Recorder {
        fn update(&self, dt_s: f64, supply_v: f64, setpoint: &SetpointSnapshot) {
            self.calls.lock().unwrap().push((dt_s, supply_v, *setpoint));
        }
    }

    #[test]
    fn test_integrator_ticks() {
        let model = Arc::new(Recorder::default());
        let setpoints = Arc::new(SharedSetpoints::new());
        setpoints.publish(&DriveDemand::Velocity(ChassisVelCmd::new(1.0, 0.0, 0.0, true)));

        let params = Params {
            period_s: 0.005,
            supply_voltage_v: 11.5,
            ..Default::default()
        };

        let mut sim = SimIntegrator::start(&params, model.clone(), setpoints).unwrap();
        thread::sleep(Duration::from_millis(100));
        sim.stop().unwrap();
        assert!(!sim.is_running());

        let calls = model.calls.lock().unwrap();
        assert!(calls.len() >= 2);
        assert_eq!(calls.len() as u64, sim.num_ticks());
        for (dt, v, sp) in calls.iter() {
            assert!(*dt >= 0.004);
            assert_eq!(*v, 11.5);
            assert_eq!(sp.cmd.vx_ms, 1.0);
        }
    }

    #[test]
    fn test_invalid_period() {
        let params = Params {
            period_s: 0.0,
            ..Default::default()
        };
        let r = SimIntegrator::start(
            &params,
            Arc::new(Recorder::default()),
            Arc::new(SharedSetpoints::new())
        );
        assert!(matches!(r, Err(SimError::InvalidPeriod(_))));
    }
}
