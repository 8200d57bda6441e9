//! Implementations for the NavBridge state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};

use super::{NavBridgeError, NavService, Params, TaskHandle};
use crate::loc::Pose;
use comms_if::{eqpt::drive::ChassisVelCmd, tc::drive::Alliance};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation bridge state.
pub struct NavBridge<S: NavService> {
    params: Params,

    service: S,

    /// The running task, if any.
    task: Option<Box<dyn TaskHandle>>,

    /// The last pose navigation was asked to reach.
    target_pose: Option<Pose>,

    /// Name of the last named path started, used to debounce repeats.
    last_named_path: Option<String>,

    demo: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S: NavService> NavBridge<S> {

    pub fn new(params: Params, service: S) -> Self {
        Self {
            params,
            service,
            task: None,
            target_pose: None,
            last_named_path: None,
            demo: false,
        }
    }

    /// Create a new bridge loading parameters from the given file.
    pub fn from_params_file(path: &str, service: S) -> Result<Self, NavBridgeError> {
        let params = params::load(path).map_err(NavBridgeError::ParamLoadError)?;
        Ok(Self::new(params, service))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn set_demo(&mut self, demo: bool) {
        self.demo = demo;
    }

    pub fn set_alliance(&mut self, alliance: Alliance) {
        self.service.set_alliance(alliance);
    }

    fn cancel_task(&mut self) {
        if let Some(mut t) = self.task.take() {
            if t.is_active() {
                debug!("Cancelling active navigation task");
            }
            t.cancel();
        }
    }

    /// Start, or restart, a point-to-point task to the pose.
    ///
    /// Ignored in demo mode.
    pub fn drive_to_pose(&mut self, pose: Pose) -> Result<(), NavBridgeError> {
        if self.demo {
            debug!("Ignoring drive to pose in demo mode");
            return Ok(());
        }

        self.cancel_task();
        self.target_pose = Some(pose);
        self.last_named_path = None;

        let task = self.service
            .start_path_to(&pose, &self.params.constraints)
            .map_err(NavBridgeError::ServiceError)?;

        info!("Driving to pose {:?}", pose);
        self.task = Some(task);

        Ok(())
    }

    /// Start the named path.
    ///
    /// Requesting the same name as the last started path does nothing until
    /// `stop` is called, as does any request in demo mode. Returns true if a
    /// task was started.
    pub fn drive_to_named_path(&mut self, name: &str) -> Result<bool, NavBridgeError> {
        if self.demo || self.last_named_path.as_deref() == Some(name) {
            return Ok(false);
        }

        self.cancel_task();
        self.last_named_path = Some(name.to_string());

        match self.service.start_named_path(name, &self.params.constraints) {
            Ok(task) => {
                info!("Driving named path \"{}\"", name);
                if let Some(goal) = task.goal() {
                    self.target_pose = Some(goal);
                }
                self.task = Some(task);
                Ok(true)
            },
            Err(e) => {
                // Allow the same name to be retried
                self.last_named_path = None;
                Err(NavBridgeError::ServiceError(e))
            }
        }
    }

    pub fn drive_to_speaker(&mut self) -> Result<bool, NavBridgeError> {
        let name = self.params.speaker_path.clone();
        self.drive_to_named_path(&name)
    }

    pub fn drive_to_source(&mut self) -> Result<bool, NavBridgeError> {
        let name = self.params.source_path.clone();
        self.drive_to_named_path(&name)
    }

    /// Drive to the nearest climb station for the alliance. Red uses the red
    /// stations, any other alliance uses blue.
    pub fn drive_to_endgame(
        &mut self,
        pose: &Pose,
        alliance: Alliance
    ) -> Result<bool, NavBridgeError> {
        let stations = match alliance {
            Alliance::Red => &self.params.endgame.red,
            _ => &self.params.endgame.blue,
        };

        // Ties go to the later station
        let mut nearest: Option<(f64, &str)> = None;
        for s in stations {
            let d = pose.distance_to(&s.pose());
            let closer = match nearest {
                Some((best, _)) => d <= best,
                None => true,
            };
            if closer {
                nearest = Some((d, &s.path));
            }
        }

        let name = match nearest {
            Some((_, n)) => n.to_string(),
            None => return Err(NavBridgeError::NoEndgameStations(alliance)),
        };

        self.drive_to_named_path(&name)
    }

    /// Cancel any task and forget the debounce memory, returning the zero
    /// command which must replace the goal demand.
    pub fn stop(&mut self) -> ChassisVelCmd {
        self.cancel_task();
        self.last_named_path = None;
        info!("Navigation stopped");
        ChassisVelCmd::zero()
    }

    /// Check on the running task, returning its demand if it is still active.
    ///
    /// A task which is no longer active is dropped. Failures are not retried.
    pub fn poll(&mut self) -> Option<ChassisVelCmd> {
        let active = match &self.task {
            Some(t) => t.is_active(),
            None => return None,
        };

        if !active {
            info!("Navigation task is no longer active");
            self.task = None;
            return None;
        }

        let demand = self.task.as_ref().and_then(|t| t.demand());
        if demand.is_none() {
            debug!("Active navigation task has no demand yet");
        }
        demand
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map(|t| t.is_active()).unwrap_or(false)
    }

    pub fn target_pose(&self) -> Option<Pose> {
        self.target_pose
    }

    pub fn last_named_path(&self) -> Option<&str> {
        self.last_named_path.as_deref()
    }

    /// True if the pose is within both the translation and rotation
    /// tolerances of the last requested target. Does not stop the task.
    pub fn at_pathfind_pose(&self, pose: &Pose) -> bool {
        match self.target_pose {
            Some(t) => {
                pose.distance_to(&t) < self.params.translation_tolerance_m
                    && pose.heading_to(&t).abs() < self.params.rotation_tolerance_rad
            },
            None => false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nav_bridge::{NavConstraints, NavServiceError};
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };

    /// Service which records what it was asked to do.
    #[derive(Default)]
    struct MockService {
        starts: Arc<AtomicUsize>,
        last_cancelled: Option<Arc<AtomicBool>>,
    }

    struct MockTask {
        cancelled: Arc<AtomicBool>,
        goal: Option<Pose>,
        has_demand: bool,
    }

    impl TaskHandle for MockTask {
        fn is_active(&self) -> bool {
            !self.cancelled.load(Ordering::SeqCst)
        }
        fn cancel(&mut self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
        fn demand(&self) -> Option<ChassisVelCmd> {
            match self.has_demand {
                true => Some(ChassisVelCmd::new(1.0, 0.0, 0.0, true)),
                false => None
            }
        }
        fn goal(&self) -> Option<Pose> {
            self.goal
        }
    }

    impl MockService {
        fn task(&mut self, goal: Option<Pose>, has_demand: bool) -> Box<dyn TaskHandle> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            let cancelled = Arc::new(AtomicBool::new(false));
            self.last_cancelled = Some(cancelled.clone());
            Box::new(MockTask { cancelled, goal, has_demand })
        }
    }

    impl NavService for MockService {
        fn start_path_to(&mut self, target: &Pose, _: &NavConstraints)
            -> Result<Box<dyn TaskHandle>, NavServiceError>
        {
            Ok(self.task(Some(*target), true))
        }

        fn start_named_path(&mut self, name: &str, _: &NavConstraints)
            -> Result<Box<dyn TaskHandle>, NavServiceError>
        {
            if name == "missing" {
                return Err(NavServiceError::UnknownPath(name.into()));
            }
            // Worker that has not produced its first demand
            Ok(self.task(None, name != "pending"))
        }
    }

    fn bridge() -> (NavBridge<MockService>, Arc<AtomicUsize>) {
        let service = MockService::default();
        let starts = service.starts.clone();
        (NavBridge::new(Params::default(), service), starts)
    }

    #[test]
    fn test_named_path_debounce() {
        let (mut nav, starts) = bridge();

        assert!(nav.drive_to_named_path("speaker").unwrap());
        for _ in 0..10 {
            assert!(!nav.drive_to_named_path("speaker").unwrap());
        }
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        // A different name starts a new task, as does the same one after stop
        assert!(nav.drive_to_named_path("shopSource").unwrap());
        nav.stop();
        assert!(nav.drive_to_named_path("shopSource").unwrap());
        assert_eq!(starts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_named_path_can_retry() {
        let (mut nav, starts) = bridge();
        assert!(nav.drive_to_named_path("missing").is_err());
        assert_eq!(nav.last_named_path(), None);
        assert!(nav.drive_to_named_path("missing").is_err());
        assert_eq!(starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop() {
        let (mut nav, _) = bridge();
        nav.drive_to_named_path("speaker").unwrap();
        let cancelled = nav.service.last_cancelled.clone().unwrap();
        assert!(nav.poll().is_some());

        let cmd = nav.stop();
        assert!(cmd.is_zero());
        assert!(cancelled.load(Ordering::SeqCst));
        assert!(!nav.is_active());
        assert_eq!(nav.last_named_path(), None);
        assert_eq!(nav.poll(), None);
    }

    #[test]
    fn test_task_without_demand_stays_active() {
        let (mut nav, starts) = bridge();
        assert!(nav.drive_to_named_path("pending").unwrap());

        for _ in 0..5 {
            assert_eq!(nav.poll(), None);
            assert!(nav.is_active());
        }
        assert!(!nav.drive_to_named_path("pending").unwrap());
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drive_to_pose_restarts() {
        let (mut nav, starts) = bridge();
        nav.drive_to_pose(Pose::new(1.0, 1.0, 0.0)).unwrap();
        let first = nav.service.last_cancelled.clone().unwrap();
        nav.drive_to_pose(Pose::new(2.0, 1.0, 0.0)).unwrap();

        assert!(first.load(Ordering::SeqCst));
        assert!(nav.is_active());
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(nav.target_pose(), Some(Pose::new(2.0, 1.0, 0.0)));
    }

    #[test]
    fn test_at_pathfind_pose_needs_both_tolerances() {
        let (mut nav, _) = bridge();
        assert!(!nav.at_pathfind_pose(&Pose::default()));

        nav.drive_to_pose(Pose::new(2.0, 3.0, 3.1)).unwrap();

        assert!(nav.at_pathfind_pose(&Pose::new(2.05, 3.0, 3.12)));
        // Wraps across +/- pi
        assert!(nav.at_pathfind_pose(&Pose::new(2.0, 3.0, -3.16)));
        // Translation only
        assert!(!nav.at_pathfind_pose(&Pose::new(2.0, 3.0, 2.5)));
        // Rotation only
        assert!(!nav.at_pathfind_pose(&Pose::new(2.5, 3.0, 3.1)));

        // Still running after arrival
        assert!(nav.is_active());
    }

    #[test]
    fn test_demo_ignores_requests() {
        let (mut nav, starts) = bridge();
        nav.set_demo(true);
        nav.drive_to_pose(Pose::new(1.0, 1.0, 0.0)).unwrap();
        assert!(!nav.drive_to_named_path("speaker").unwrap());
        assert_eq!(starts.load(Ordering::SeqCst), 0);
        assert_eq!(nav.target_pose(), None);
    }

    #[test]
    fn test_endgame_nearest() {
        let (mut nav, _) = bridge();

        nav.drive_to_endgame(&Pose::new(4.0, 4.6, 0.0), Alliance::Blue).unwrap();
        assert_eq!(nav.last_named_path(), Some("leftEndgame"));

        nav.drive_to_endgame(&Pose::new(12.0, 3.6, 0.0), Alliance::Red).unwrap();
        assert_eq!(nav.last_named_path(), Some("rightEndgame"));

        // Unknown uses the blue stations
        nav.drive_to_endgame(&Pose::new(6.0, 4.1, 0.0), Alliance::Unknown).unwrap();
        assert_eq!(nav.last_named_path(), Some("farEndgame"));
    }

    #[test]
    fn test_shortcuts() {
        let (mut nav, _) = bridge();
        nav.drive_to_speaker().unwrap();
        assert_eq!(nav.last_named_path(), Some("speaker"));
        nav.drive_to_source().unwrap();
        assert_eq!(nav.last_named_path(), Some("shopSource"));
    }
}
