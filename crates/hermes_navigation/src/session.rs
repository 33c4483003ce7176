use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use tokio::{
    sync::{oneshot, watch},
    task::AbortHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::NavigationConfig,
    coordinate::Coordinate,
    error::SessionError,
    eta,
    fix::Fix,
    off_route::{OffRouteDetector, RerouteState},
    progress::ProgressTracker,
    route::{NavigationStep, Route},
    route_planner::RoutePlanner,
    speed::SpeedEstimator,
    steps::{StepEvent, StepNavigator},
    transport_mode::TransportMode,
    units::{Kmh, Meters},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Rerouting,
    Completed,
    Stopped,
}

/// What happened to rerouting since the previous update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RerouteEvent {
    Requested,
    Installed,
    /// The stale route is kept, a retry happens after the cooldown
    Failed(String),
}

/// Produced for every processed fix.
#[derive(Clone, Debug)]
pub struct NavigationUpdate {
    pub state: SessionState,
    pub route: Arc<Route>,
    pub point_index: usize,
    pub step_index: usize,
    pub current_step: NavigationStep,
    pub next_step: Option<NavigationStep>,
    pub distance_to_step_end: Meters,
    pub distance_to_route: Meters,
    pub remaining_distance: Meters,
    pub remaining_duration: SignedDuration,
    pub arrival: Timestamp,
    pub speed: Kmh,
    pub off_route: bool,
    pub reroute_state: RerouteState,
    pub rerouting: bool,
    pub arrived: bool,
    pub reroute_events: Vec<RerouteEvent>,
}

#[derive(Default)]
struct Control {
    stopped: bool,
    reroute: Option<AbortHandle>,
}

impl Control {
    fn abort_reroute(&mut self) {
        if let Some(handle) = self.reroute.take() {
            handle.abort();
        }
    }
}

/// Stops a session from another task or thread.
#[derive(Clone)]
pub struct StopHandle {
    control: Arc<Mutex<Control>>,
    signal: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        {
            let mut control = self.control.lock();
            control.stopped = true;
            control.abort_reroute();
        }
        self.signal.send_replace(true);
    }
}

struct ActiveNavigation {
    route: Arc<Route>,
    destination: Coordinate,
    tracker: ProgressTracker,
    steps: StepNavigator,
    detector: OffRouteDetector,
    speed: SpeedEstimator,
    pending_reroute: Option<oneshot::Receiver<anyhow::Result<Route>>>,
    events: Vec<RerouteEvent>,
    last_fix_ms: Option<i64>,
}

impl ActiveNavigation {
    fn new(route: Route, destination: Coordinate, config: &NavigationConfig) -> Self {
        ActiveNavigation {
            route: Arc::new(route),
            destination,
            tracker: ProgressTracker::new(config.tracker.clone()),
            steps: StepNavigator::new(config.step_completion_radius),
            detector: OffRouteDetector::new(config.off_route.clone()),
            speed: SpeedEstimator::new(config.speed.clone()),
            pending_reroute: None,
            events: Vec::new(),
            last_fix_ms: None,
        }
    }

    fn request_reroute<P: RoutePlanner>(
        &mut self,
        planner: &Arc<P>,
        mode: TransportMode,
        origin: Coordinate,
        control: &Mutex<Control>,
    ) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(error) => {
                warn!(%error, "Cannot request a new route outside of a tokio runtime");
                self.detector.reroute_failed();
                self.events.push(RerouteEvent::Failed(error.to_string()));
                return;
            }
        };

        let (sender, receiver) = oneshot::channel();
        let planner = Arc::clone(planner);
        let destination = self.destination;

        let task = runtime.spawn(async move {
            let result = planner.plan_route(origin, destination, mode).await;
            // The receiver is gone if the session moved on in the meantime
            let _ = sender.send(result);
        });

        let mut control = control.lock();

        // Stopped from another thread while this fix was being processed
        if control.stopped {
            task.abort();
            self.detector.reroute_failed();
            return;
        }

        control.abort_reroute();
        control.reroute = Some(task.abort_handle());

        self.pending_reroute = Some(receiver);
        self.events.push(RerouteEvent::Requested);
    }

    /// Applies a finished reroute, if any, without waiting.
    fn poll_reroute(&mut self, now_ms: i64, control: &Mutex<Control>) {
        let Some(receiver) = self.pending_reroute.as_mut() else {
            return;
        };

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(anyhow::anyhow!("Reroute request was cancelled"))
            }
        };

        self.pending_reroute = None;
        control.lock().reroute = None;
        self.apply_reroute(result, now_ms);
    }

    fn apply_reroute(&mut self, result: anyhow::Result<Route>, now_ms: i64) {
        match result {
            Ok(route) => {
                info!(
                    points = route.len(),
                    steps = route.steps().len(),
                    distance = %route.distance(),
                    "Installed new route"
                );
                self.route = Arc::new(route);
                self.tracker.reset();
                self.steps.reset();
                self.detector.reroute_succeeded(now_ms);
                self.events.push(RerouteEvent::Installed);
            }
            Err(error) => {
                warn!(error = %error, "Reroute failed, keeping the current route");
                self.detector.reroute_failed();
                self.events.push(RerouteEvent::Failed(format!("{error:#}")));
            }
        }
    }

    fn cancel_reroute(&mut self, control: &Mutex<Control>) {
        if self.pending_reroute.take().is_some() {
            control.lock().abort_reroute();
            self.detector.reroute_failed();
        }
    }
}

/// Drives navigation along a route, one fix at a time.
///
/// Fixes must be fed sequentially. Reroutes run as tokio tasks off the fix
/// path and their result is applied at the start of the next `on_fix` (or by
/// `settle_reroute`), never in the middle of one.
pub struct NavigationSession<P: RoutePlanner> {
    planner: Arc<P>,
    config: NavigationConfig,
    state: SessionState,
    navigation: Option<ActiveNavigation>,
    control: Arc<Mutex<Control>>,
    stop_signal: Arc<watch::Sender<bool>>,
}

impl<P: RoutePlanner> NavigationSession<P> {
    pub fn new(planner: Arc<P>, config: NavigationConfig) -> Self {
        NavigationSession {
            planner,
            config,
            state: SessionState::Idle,
            navigation: None,
            control: Arc::new(Mutex::new(Control::default())),
            stop_signal: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.control.lock().stopped {
            return SessionState::Stopped;
        }

        match (self.state, &self.navigation) {
            (SessionState::Active, Some(navigation)) if navigation.detector.is_rerouting() => {
                SessionState::Rerouting
            }
            (state, _) => state,
        }
    }

    pub fn route(&self) -> Option<Arc<Route>> {
        self.navigation
            .as_ref()
            .map(|navigation| Arc::clone(&navigation.route))
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            control: Arc::clone(&self.control),
            signal: Arc::clone(&self.stop_signal),
        }
    }

    /// Turns `true` once the session is stopped, from any thread.
    pub fn stop_signal(&self) -> watch::Receiver<bool> {
        self.stop_signal.subscribe()
    }

    pub fn start(&mut self, route: Route, destination: Coordinate) -> Result<(), SessionError> {
        self.sync_stopped();

        self.ensure_startable()?;

        {
            let mut control = self.control.lock();
            control.stopped = false;
            control.abort_reroute();
        }
        self.stop_signal.send_replace(false);

        info!(
            points = route.len(),
            steps = route.steps().len(),
            distance = %route.distance(),
            %destination,
            "Starting navigation"
        );

        self.navigation = Some(ActiveNavigation::new(route, destination, &self.config));
        self.state = SessionState::Active;

        Ok(())
    }

    /// Plans the initial route with the routing service and starts on it.
    pub async fn plan_and_start(
        &mut self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> anyhow::Result<()> {
        self.sync_stopped();
        self.ensure_startable()?;

        let route = self
            .planner
            .plan_route(origin, destination, self.config.transport_mode)
            .await?;

        self.start(route, destination)?;

        Ok(())
    }

    pub fn on_fix(&mut self, fix: Fix) -> Result<NavigationUpdate, SessionError> {
        self.sync_stopped();

        match self.state {
            SessionState::Active => {}
            SessionState::Completed => return Err(SessionError::Completed),
            _ => return Err(SessionError::NotActive),
        }

        let now = fix.timestamp()?;

        let Some(navigation) = self.navigation.as_mut() else {
            return Err(SessionError::NotActive);
        };

        navigation.poll_reroute(fix.timestamp_ms, &self.control);
        navigation.last_fix_ms = Some(fix.timestamp_ms);
        navigation.speed.record(&fix);

        let route = Arc::clone(&navigation.route);
        let threshold = self.config.off_route.threshold;

        let progress = navigation
            .tracker
            .update(&route, &fix.coordinate, threshold);
        let step = navigation.steps.update(&route, &fix.coordinate);
        let arrived = step.event == StepEvent::Arrived;

        let distance_to_route = OffRouteDetector::distance_to_route(&route, &fix.coordinate);

        if arrived {
            navigation.cancel_reroute(&self.control);
        } else {
            let status = navigation
                .detector
                .observe(distance_to_route, fix.timestamp_ms);

            if status.trigger {
                navigation.request_reroute(
                    &self.planner,
                    self.config.transport_mode,
                    fix.coordinate,
                    &self.control,
                );
            }
        }

        let speed = eta::effective_speed(navigation.speed.estimate(), self.config.transport_mode);
        let eta = eta::summarize(&route, progress.index, &fix.coordinate, now, speed);

        let rerouting = navigation.detector.is_rerouting();
        let state = if arrived {
            SessionState::Completed
        } else if rerouting {
            SessionState::Rerouting
        } else {
            SessionState::Active
        };

        debug!(
            point = progress.index,
            step = step.index,
            distance_to_route = %distance_to_route,
            remaining = %eta.remaining_distance,
            ?state,
            "Processed fix"
        );

        let update = NavigationUpdate {
            state,
            point_index: progress.index,
            step_index: step.index,
            current_step: navigation.steps.current_step(&route).clone(),
            next_step: navigation.steps.next_step(&route).cloned(),
            distance_to_step_end: step.distance_to_step_end,
            distance_to_route,
            remaining_distance: eta.remaining_distance,
            remaining_duration: eta.remaining_duration,
            arrival: eta.arrival,
            speed: eta.speed,
            off_route: distance_to_route > threshold,
            reroute_state: navigation.detector.state(fix.timestamp_ms),
            rerouting,
            arrived,
            reroute_events: std::mem::take(&mut navigation.events),
            route,
        };

        if arrived {
            info!("Arrived at destination");
            self.state = SessionState::Completed;
        }

        Ok(update)
    }

    /// Waits for the in-flight reroute, if any, and applies its outcome.
    pub async fn settle_reroute(&mut self) -> Option<RerouteEvent> {
        let navigation = self.navigation.as_mut()?;
        let receiver = navigation.pending_reroute.take()?;

        let result = receiver
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("Reroute request was cancelled")));

        self.control.lock().reroute = None;

        let now_ms = navigation.last_fix_ms.unwrap_or_default();
        navigation.apply_reroute(result, now_ms);

        navigation.events.last().cloned()
    }

    /// Ends navigation and cancels any in-flight reroute. Later fixes are
    /// rejected until the next `start`.
    pub fn stop(&mut self) {
        self.stop_handle().stop();
        self.release();
        info!("Navigation stopped");
    }

    /// A completed navigation is terminal until `stop` is called.
    fn ensure_startable(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Stopped => Ok(()),
            SessionState::Active | SessionState::Rerouting => Err(SessionError::AlreadyActive),
            SessionState::Completed => Err(SessionError::Completed),
        }
    }

    fn sync_stopped(&mut self) {
        if self.state != SessionState::Stopped && self.control.lock().stopped {
            self.release();
        }
    }

    fn release(&mut self) {
        self.control.lock().abort_reroute();
        self.navigation = None;
        self.state = SessionState::Stopped;
    }
}

impl<P: RoutePlanner> Drop for NavigationSession<P> {
    fn drop(&mut self) {
        self.control.lock().abort_reroute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_three_point_route;

    /// Never answers, like a routing service that hangs.
    struct HangingPlanner;

    impl RoutePlanner for HangingPlanner {
        async fn plan_route(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
            _mode: TransportMode,
        ) -> anyhow::Result<Route> {
            std::future::pending().await
        }
    }

    fn off_route_fix(seconds: i64) -> Fix {
        Fix::new(Coordinate::new(0.0018, 0.001), seconds * 1_000)
    }

    #[tokio::test]
    async fn test_reroute_requested_after_stop_is_discarded() {
        let config = NavigationConfig::default();
        let mut navigation = ActiveNavigation::new(
            create_three_point_route(),
            Coordinate::new(0.0, 0.002),
            &config,
        );
        let control = Mutex::new(Control {
            stopped: true,
            reroute: None,
        });

        navigation.request_reroute(
            &Arc::new(HangingPlanner),
            TransportMode::Car,
            Coordinate::new(0.0018, 0.001),
            &control,
        );

        assert!(navigation.pending_reroute.is_none());
        assert!(navigation.events.is_empty());
        assert!(control.lock().reroute.is_none());
    }

    #[tokio::test]
    async fn test_stop_seen_on_next_fix_aborts_in_flight_reroute() {
        let mut session =
            NavigationSession::new(Arc::new(HangingPlanner), NavigationConfig::default());
        session
            .start(create_three_point_route(), Coordinate::new(0.0, 0.002))
            .unwrap();

        for i in 0..3 {
            session.on_fix(off_route_fix(i)).unwrap();
        }
        assert!(session.control.lock().reroute.is_some());

        // Flag set without going through the handle's abort
        session.control.lock().stopped = true;

        assert!(matches!(
            session.on_fix(off_route_fix(3)),
            Err(SessionError::NotActive)
        ));
        assert!(session.control.lock().reroute.is_none());
        assert_eq!(session.state(), SessionState::Stopped);
    }
}
