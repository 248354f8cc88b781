//! Owner of the one periodic timer that moves the vehicle.
//!
//! At most one tick task exists per driver. Starting again, stopping, or
//! dropping the driver tears the current task down before anything else runs.

use std::sync::Arc;

use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use trip_route::{AnnotatedRoute, Spherical, SphericalGeometry};

use crate::map::TripMap;
use crate::render::RenderSurface;
use crate::settings::TICK_INTERVAL;
use crate::simulator::{Phase, TripState};

struct RunningTimer {
    stop_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl Drop for RunningTimer {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.join.abort();
    }
}

pub struct SimulationDriver<S> {
    map: Arc<Mutex<TripMap<S>>>,
    geometry: Arc<dyn SphericalGeometry>,
    updates: watch::Sender<TripState>,
    timer: Option<RunningTimer>,
    runs: u64,
}

impl<S: RenderSurface + 'static> SimulationDriver<S> {
    /// Mount `map` and wait, idle, for [`start`](Self::start).
    pub fn new(map: TripMap<S>) -> Self {
        Self::with_geometry(map, Arc::new(Spherical))
    }

    pub fn with_geometry(
        mut map: TripMap<S>,
        geometry: Arc<dyn SphericalGeometry>,
    ) -> Self {
        map.mount();
        let (updates, _) = watch::channel(TripState::default());

        Self {
            map: Arc::new(Mutex::new(map)),
            geometry,
            updates,
            timer: None,
            runs: 0,
        }
    }

    /// Begin a fresh run from now, cancelling any run in progress.
    pub async fn start(&mut self) {
        self.stop();

        let started_at = Instant::now();
        let state = TripState::started(started_at);
        self.map.lock().await.clear_progress();
        self.updates.send_replace(state.clone());
        self.runs += 1;

        tracing::info!(run = self.runs, "starting simulation");

        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(tick_loop(
            Arc::clone(&self.map),
            Arc::clone(&self.geometry),
            state,
            self.updates.clone(),
            stop_rx,
        ));

        self.timer = Some(RunningTimer {
            stop_tx: Some(stop_tx),
            join,
        });
    }

    /// Cancel the current run, if any. The map keeps whatever it last showed.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            tracing::debug!(run = self.runs, "cancelling simulation timer");
            drop(timer);
            self.updates.send_if_modified(|state| {
                let halted = state.halted();
                let changed = halted != *state;
                *state = halted;
                changed
            });
        }
    }

    /// Replace the route. The current run is cancelled and the state reset.
    pub async fn set_route(&mut self, route: AnnotatedRoute) {
        self.stop();
        self.map.lock().await.set_route(route);
        self.updates.send_replace(TripState::default());
    }

    /// Whether a tick task is alive.
    pub fn is_running(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| !timer.join.is_finished())
    }

    /// Latest state produced by the simulation.
    pub fn state(&self) -> TripState {
        self.updates.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<TripState> {
        self.updates.subscribe()
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn map(&self) -> Arc<Mutex<TripMap<S>>> {
        Arc::clone(&self.map)
    }
}

async fn tick_loop<S: RenderSurface>(
    map: Arc<Mutex<TripMap<S>>>,
    geometry: Arc<dyn SphericalGeometry>,
    mut state: TripState,
    updates: watch::Sender<TripState>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let Some(started_at) = state.started_at() else {
        return;
    };
    let mut ticker = tokio::time::interval_at(started_at + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let next = {
                    let mut map = map.lock().await;
                    let next = state.advance(map.route(), geometry.as_ref(), Instant::now());
                    if next != state {
                        map.show(&next);
                    }
                    next
                };

                state = next;
                updates.send_replace(state.clone());

                if state.phase() == Phase::Completed {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingSurface;
    use geo::Point;
    use std::time::Duration;
    use tokio::time::sleep;
    use trip_route::{Route, RouteIdentifier, RoutePoint, Stop};

    fn line(meters: &[f64]) -> AnnotatedRoute {
        AnnotatedRoute::from_points(
            RouteIdentifier::new("test"),
            meters
                .iter()
                .enumerate()
                .map(|(i, &d)| {
                    RoutePoint::with_distance(Point::new(i as f64 * 0.001, 0.0), d)
                })
                .collect(),
        )
    }

    fn driver(route: AnnotatedRoute) -> (SimulationDriver<RecordingSurface>, RecordingSurface) {
        let surface = RecordingSurface::default();
        let stops = vec![Stop::new("start", Point::new(0.0, 0.0))];
        let map = TripMap::new(surface.clone(), route, stops);
        (SimulationDriver::new(map), surface)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_until_started() {
        let (driver, surface) = driver(line(&[0.0, 500.0, 1000.0]));

        sleep(Duration::from_secs(3)).await;

        assert!(!driver.is_running());
        assert_eq!(driver.state().phase(), Phase::Idle);
        assert_eq!(surface.progress_draws(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_second() {
        let (mut driver, surface) = driver(line(&[0.0, 500.0, 1000.0]));
        driver.start().await;

        sleep(Duration::from_millis(3500)).await;

        assert!(driver.is_running());
        assert_eq!(surface.progress_draws(), 3);

        let state = driver.state();
        assert_eq!(state.phase(), Phase::Running);
        assert_eq!(state.progress().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_ticking_when_complete() {
        // 2 s * 27 m/s = 54 m is past the last point
        let (mut driver, surface) = driver(line(&[0.0, 20.0, 40.0]));
        let mut updates = driver.subscribe();
        driver.start().await;

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(driver.state().phase(), Phase::Completed);
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().progress().len(), 3);

        sleep(Duration::from_secs(5)).await;
        assert!(!driver.is_running());
        assert_eq!(surface.progress_draws(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_timer() {
        let (mut driver, surface) = driver(line(&[0.0, 500.0, 1000.0]));

        driver.start().await;
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(surface.progress_draws(), 2);

        driver.start().await;
        sleep(Duration::from_millis(3200)).await;

        // 2 ticks from the first run, 3 from the second; a leaked timer would add 3 more
        assert_eq!(surface.progress_draws(), 5);
        assert_eq!(driver.runs(), 2);

        // The second run restarted from zero: 3 s * 27 m/s
        let state = driver.state();
        let started_at = state.started_at().unwrap();
        let elapsed = state.elapsed_distance(started_at + Duration::from_secs(3));
        assert_eq!(elapsed, Some(81.0));
        assert!(state.progress().last().unwrap().x() < 0.001);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_clears_shown_progress() {
        let (mut driver, surface) = driver(line(&[0.0, 500.0, 1000.0]));

        driver.start().await;
        sleep(Duration::from_millis(1500)).await;
        assert!(driver.map().lock().await.vehicle().is_some());

        driver.start().await;
        assert!(driver.map().lock().await.vehicle().is_none());
        // Only the stop marker is left
        assert_eq!(surface.marker_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_publishes_idle_state() {
        let (mut driver, surface) = driver(line(&[0.0, 500.0]));
        let mut updates = driver.subscribe();
        driver.start().await;
        sleep(Duration::from_millis(1500)).await;
        let shown = driver.state();
        assert_eq!(shown.phase(), Phase::Running);

        updates.borrow_and_update();
        driver.stop();

        assert!(!driver.is_running());
        assert!(updates.has_changed().unwrap());
        let state = updates.borrow_and_update().clone();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.progress(), shown.progress());

        // Stopping again leaves the published state alone
        driver.stop();
        assert!(!updates.has_changed().unwrap());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(driver.state().phase(), Phase::Idle);
        assert_eq!(surface.progress_draws(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_timer() {
        let (mut driver, surface) = driver(line(&[0.0, 500.0, 1000.0]));
        driver.start().await;
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(surface.progress_draws(), 1);

        drop(driver);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(surface.progress_draws(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_route_resets_state() {
        let (mut driver, surface) = driver(line(&[0.0, 500.0, 1000.0]));
        driver.start().await;
        sleep(Duration::from_millis(1500)).await;

        let route =
            Route::new("other", vec![Point::new(5.0, 5.0), Point::new(5.01, 5.0)]).annotate();
        driver.set_route(route).await;

        assert!(!driver.is_running());
        assert_eq!(driver.state(), TripState::default());
        assert_eq!(driver.map().lock().await.route().id().as_str(), "other");

        sleep(Duration::from_secs(3)).await;
        assert_eq!(surface.progress_draws(), 1);
    }
}
