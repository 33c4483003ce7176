#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use hermes_navigation::{
    coordinate::Coordinate,
    fix::Fix,
    polyline,
    route::{Maneuver, PlannedStep, Route, RoutePlan, StepGeometry},
    route_planner::RoutePlanner,
    transport_mode::TransportMode,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub const START_MS: i64 = 1_700_000_000_000;

/// ~200m north of the equator
pub const OFF_ROUTE_LAT: f64 = 0.0018;

pub fn fix(lat: f64, lng: f64, seconds: i64) -> Fix {
    Fix::new(Coordinate::new(lat, lng), START_MS + seconds * 1_000)
}

pub fn create_plan(points: &[(f64, f64)], step_ends: &[(f64, f64)]) -> RoutePlan {
    let coordinates = points
        .iter()
        .map(|&(lat, lng)| Coordinate::new(lat, lng))
        .collect::<Vec<_>>();

    let mut start = coordinates[0];
    let steps = step_ends
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng))| {
            let end = Coordinate::new(lat, lng);
            let step = PlannedStep {
                instruction: format!("Step {i}"),
                maneuver: Some(Maneuver::Straight),
                geometry: StepGeometry::Endpoints { start, end },
                distance: 0.0,
                duration: 0.0,
            };
            start = end;
            step
        })
        .collect();

    RoutePlan {
        distance: 222.0,
        duration: 20.0,
        polyline: polyline::encode(&coordinates),
        steps,
    }
}

/// `(0,0) -> (0,0.001) -> (0,0.002)`, a single step ending at the last point.
pub fn three_point_route() -> Route {
    Route::try_from(create_plan(
        &[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)],
        &[(0.0, 0.002)],
    ))
    .unwrap()
}

/// A route running north from the off-route fixes to the destination.
pub fn detour_route() -> Route {
    Route::try_from(create_plan(
        &[(OFF_ROUTE_LAT, 0.0015), (0.001, 0.002), (0.0, 0.002)],
        &[(0.001, 0.002), (0.0, 0.002)],
    ))
    .unwrap()
}

pub enum MockResponse {
    Route(Route),
    Fail(&'static str),
}

#[derive(Default)]
pub struct MockPlanner {
    calls: AtomicUsize,
    requests: Mutex<Vec<(Coordinate, Coordinate, TransportMode)>>,
    responses: Mutex<VecDeque<MockResponse>>,
    gate: Option<Arc<Notify>>,
}

impl MockPlanner {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        MockPlanner {
            responses: Mutex::new(responses.into()),
            ..MockPlanner::default()
        }
    }

    /// Requests wait for a permit on `gate` before answering.
    pub fn gated(responses: Vec<MockResponse>, gate: Arc<Notify>) -> Self {
        MockPlanner {
            responses: Mutex::new(responses.into()),
            gate: Some(gate),
            ..MockPlanner::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(Coordinate, Coordinate, TransportMode)> {
        self.requests.lock().clone()
    }
}

impl RoutePlanner for MockPlanner {
    async fn plan_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> anyhow::Result<Route> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((origin, destination, mode));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let response = self.responses.lock().pop_front();
        match response {
            Some(MockResponse::Route(route)) => Ok(route),
            Some(MockResponse::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("No route available")),
        }
    }
}
