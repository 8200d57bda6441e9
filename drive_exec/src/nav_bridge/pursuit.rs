//! # Pursuit navigation service
//!
//! A simple navigation service which drives through a list of waypoints with a
//! proportional pursuit law, limited by the task's constraints. Each task runs
//! on its own worker thread, publishing its latest demand for the control loop
//! to poll.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace, warn};
use nalgebra::Vector2;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use super::{NavConstraints, NavService, NavServiceError, PursuitParams, TaskHandle};
use crate::loc::{Pose, PoseSource};
use comms_if::{eqpt::drive::ChassisVelCmd, tc::drive::Alliance};
use util::maths::{ang_dist, clamp, wrap_to_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation service driving waypoint lists with proportional pursuit.
pub struct PursuitNavService {
    params: PursuitParams,
    pose_source: Arc<dyn PoseSource>,
    alliance: Alliance,
    named_paths: HashMap<String, Vec<Pose>>,
}

/// Handle to a pursuit task.
pub struct PursuitTask {
    shared: Arc<TaskShared>,
    goal: Pose,
}

/// Data shared between a task handle and its worker.
struct TaskShared {
    cancel: AtomicBool,
    finished: AtomicBool,
    demand: Mutex<Option<ChassisVelCmd>>,
}

/// Worker-side state.
struct Pursuer {
    params: PursuitParams,
    constraints: NavConstraints,
    waypoints: Vec<Pose>,
    current: usize,
    prev_cmd: ChassisVelCmd,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PursuitNavService {
    pub fn new(params: PursuitParams, pose_source: Arc<dyn PoseSource>) -> Self {
        let named_paths = params.named_paths
            .iter()
            .map(|(name, wps)| {
                (name.clone(), wps.iter().map(|w| Pose::new(w[0], w[1], w[2])).collect())
            })
            .collect();

        Self {
            params,
            pose_source,
            alliance: Alliance::Unknown,
            named_paths,
        }
    }

    /// Mirror a blue-side pose onto the red half of the field.
    fn mirror(&self, pose: &Pose) -> Pose {
        Pose::new(
            self.params.field_length_m - pose.position_m[0],
            pose.position_m[1],
            wrap_to_pi(std::f64::consts::PI - pose.heading_rad)
        )
    }

    fn start(
        &self,
        waypoints: Vec<Pose>,
        constraints: &NavConstraints
    ) -> Result<Box<dyn TaskHandle>, NavServiceError> {
        // Callers check for empty lists
        let goal = waypoints[waypoints.len() - 1];

        let shared = Arc::new(TaskShared {
            cancel: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            demand: Mutex::new(None),
        });

        let pursuer = Pursuer {
            params: self.params.clone(),
            constraints: *constraints,
            waypoints,
            current: 0,
            prev_cmd: ChassisVelCmd::zero(),
        };

        let shared_worker = shared.clone();
        let source = self.pose_source.clone();

        thread::Builder::new()
            .name("nav_bridge::pursuit".into())
            .spawn(move || pursuer.run(shared_worker, source))
            .map_err(NavServiceError::TaskStartError)?;

        Ok(Box::new(PursuitTask { shared, goal }))
    }
}

impl NavService for PursuitNavService {
    fn start_path_to(
        &mut self,
        target: &Pose,
        constraints: &NavConstraints
    ) -> Result<Box<dyn TaskHandle>, NavServiceError> {
        self.start(vec![*target], constraints)
    }

    fn start_named_path(
        &mut self,
        name: &str,
        constraints: &NavConstraints
    ) -> Result<Box<dyn TaskHandle>, NavServiceError> {
        let waypoints = self.named_paths
            .get(name)
            .ok_or_else(|| NavServiceError::UnknownPath(name.into()))?;

        if waypoints.is_empty() {
            return Err(NavServiceError::EmptyPath(name.into()));
        }

        let waypoints = match self.alliance {
            Alliance::Red => waypoints.iter().map(|w| self.mirror(w)).collect(),
            _ => waypoints.clone(),
        };

        self.start(waypoints, constraints)
    }

    fn set_alliance(&mut self, alliance: Alliance) {
        self.alliance = alliance;
    }
}

impl TaskHandle for PursuitTask {
    fn is_active(&self) -> bool {
        !self.shared.cancel.load(Ordering::SeqCst)
            && !self.shared.finished.load(Ordering::SeqCst)
    }

    fn cancel(&mut self) {
        self.shared.cancel.store(true, Ordering::SeqCst);
    }

    fn demand(&self) -> Option<ChassisVelCmd> {
        match self.shared.demand.lock() {
            Ok(d) => *d,
            Err(_) => None,
        }
    }

    fn goal(&self) -> Option<Pose> {
        Some(self.goal)
    }
}

impl Drop for PursuitTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Pursuer {
    fn run(mut self, shared: Arc<TaskShared>, source: Arc<dyn PoseSource>) {
        let period = Duration::from_secs_f64(self.params.period_s);
        let mut last = Instant::now();

        debug!("Pursuit task started with {} waypoints", self.waypoints.len());

        while !shared.cancel.load(Ordering::SeqCst) {
            thread::sleep(period);

            let now = Instant::now();
            let dt = (now - last).as_secs_f64();
            last = now;

            let pose = match source.pose() {
                Some(p) => p,
                None => continue,
            };

            let cmd = match self.step(&pose, dt) {
                Some(c) => c,
                None => {
                    debug!("Pursuit task reached its goal");
                    break;
                }
            };

            match shared.demand.lock() {
                Ok(mut d) => *d = Some(cmd),
                Err(_) => {
                    warn!("Pursuit demand lock poisoned, ending task");
                    break;
                }
            }
        }

        if let Ok(mut d) = shared.demand.lock() {
            *d = None;
        }
        shared.finished.store(true, Ordering::SeqCst);
    }

    /// Compute the next demand, or `None` once the final waypoint is reached.
    fn step(&mut self, pose: &Pose, dt: f64) -> Option<ChassisVelCmd> {
        // Advance past reached waypoints, the last one also needs its heading
        loop {
            let wp = self.waypoints.get(self.current)?;
            let is_final = self.current + 1 == self.waypoints.len();

            let reached = pose.distance_to(wp) < self.params.waypoint_tolerance_m
                && (!is_final || pose.heading_to(wp).abs() < self.params.waypoint_tolerance_rad);

            if !reached {
                break;
            }
            self.current += 1;
        }

        let wp = self.waypoints[self.current];
        let c = &self.constraints;

        // Translation, velocity limited then acceleration limited
        let mut vel = (wp.position_m - pose.position_m) * self.params.k_p_trans;
        if vel.norm() > c.max_vel_ms {
            vel = vel.normalize() * c.max_vel_ms;
        }
        let prev = Vector2::new(self.prev_cmd.vx_ms, self.prev_cmd.vy_ms);
        let dv = vel - prev;
        let max_dv = c.max_accel_mss * dt;
        if dv.norm() > max_dv {
            vel = prev + dv.normalize() * max_dv;
        }

        // Rotation, same limits
        let mut omega = clamp(
            &(ang_dist(pose.heading_rad, wp.heading_rad) * self.params.k_p_rot),
            &-c.max_ang_vel_rads,
            &c.max_ang_vel_rads
        );
        let max_domega = c.max_ang_accel_radss * dt;
        omega = clamp(
            &omega,
            &(self.prev_cmd.omega_rads - max_domega),
            &(self.prev_cmd.omega_rads + max_domega)
        );

        let cmd = ChassisVelCmd::new(vel[0], vel[1], omega, true);
        trace!("Pursuit to waypoint {}: {:?}", self.current, cmd);

        self.prev_cmd = cmd;
        Some(cmd)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FixedPose(Pose);

    impl PoseSource for FixedPose {
        fn pose(&self) -> Option<Pose> {
            Some(self.0)
        }
        fn velocity(&self) -> Vector2<f64> {
            Vector2::zeros()
        }
    }

    fn service(pose: Pose) -> PursuitNavService {
        PursuitNavService::new(PursuitParams::default(), Arc::new(FixedPose(pose)))
    }

    fn pursuer(waypoints: Vec<Pose>) -> Pursuer {
        Pursuer {
            params: PursuitParams::default(),
            constraints: NavConstraints::default(),
            waypoints,
            current: 0,
            prev_cmd: ChassisVelCmd::zero(),
        }
    }

    #[test]
    fn test_step_limits() {
        let mut p = pursuer(vec![Pose::new(10.0, 0.0, 0.0)]);
        let c = NavConstraints::default();

        // Acceleration limited from rest
        let cmd = p.step(&Pose::new(0.0, 0.0, 0.0), 0.1).unwrap();
        assert!((cmd.vx_ms - c.max_accel_mss * 0.1).abs() < 1e-9);

        // Velocity limited once up to speed
        for _ in 0..100 {
            p.step(&Pose::new(0.0, 0.0, 0.0), 0.1);
        }
        let cmd = p.step(&Pose::new(0.0, 0.0, 0.0), 0.1).unwrap();
        assert!((cmd.vx_ms - c.max_vel_ms).abs() < 1e-9);
        assert!(cmd.field_relative);
    }

    #[test]
    fn test_step_finishes_at_goal() {
        let mut p = pursuer(vec![Pose::new(1.0, 0.0, 0.0), Pose::new(2.0, 0.0, 1.0)]);
        assert!(p.step(&Pose::new(1.0, 0.0, 0.0), 0.01).is_some());
        assert_eq!(p.current, 1);

        // Final waypoint needs heading too
        assert!(p.step(&Pose::new(2.0, 0.0, 0.0), 0.01).is_some());
        assert!(p.step(&Pose::new(2.0, 0.0, 1.0), 0.01).is_none());
    }

    #[test]
    fn test_task_finishes_when_at_goal() {
        let goal = Pose::new(1.0, 2.0, 0.5);
        let mut s = service(goal);
        let task = s.start_path_to(&goal, &NavConstraints::default()).unwrap();
        assert_eq!(task.goal(), Some(goal));

        let start = Instant::now();
        while task.is_active() && start.elapsed() < Duration::from_secs(2) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!task.is_active());
        assert_eq!(task.demand(), None);
    }

    #[test]
    fn test_cancel() {
        let mut s = service(Pose::default());
        let mut task = s.start_path_to(&Pose::new(5.0, 0.0, 0.0), &NavConstraints::default()).unwrap();
        assert!(task.is_active());
        task.cancel();
        assert!(!task.is_active());
    }

    #[test]
    fn test_named_paths() {
        let mut s = service(Pose::default());
        assert!(matches!(
            s.start_named_path("nowhere", &NavConstraints::default()),
            Err(NavServiceError::UnknownPath(_))
        ));

        s.set_alliance(Alliance::Red);
        let task = s.start_named_path("speaker", &NavConstraints::default()).unwrap();
        let goal = task.goal().unwrap();
        assert!((goal.position_m[0] - (16.54 - 1.9)).abs() < 1e-9);
        assert!(ang_dist(goal.heading_rad, 0.0).abs() < 1e-9);
    }
}
