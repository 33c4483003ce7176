use crate::{
    coordinate::Coordinate,
    polyline,
    route::{Maneuver, PlannedStep, Route, RoutePlan, StepGeometry},
};

pub fn create_step(start: (f64, f64), end: (f64, f64), maneuver: Maneuver) -> PlannedStep {
    PlannedStep {
        instruction: format!("{maneuver:?}"),
        maneuver: Some(maneuver),
        geometry: StepGeometry::Endpoints {
            start: Coordinate::new(start.0, start.1),
            end: Coordinate::new(end.0, end.1),
        },
        distance: 0.0,
        duration: 0.0,
    }
}

pub fn create_plan(points: &[(f64, f64)], steps: Vec<PlannedStep>) -> RoutePlan {
    let coordinates = points
        .iter()
        .map(|&(lat, lng)| Coordinate::new(lat, lng))
        .collect::<Vec<_>>();

    RoutePlan {
        distance: crate::geometry::polyline_length(&coordinates).value(),
        duration: 60.0,
        polyline: polyline::encode(&coordinates),
        steps,
    }
}

/// `(0,0) -> (0,0.001) -> (0,0.002)` with a single step, ~222m along the equator.
pub fn create_three_point_route() -> Route {
    Route::try_from(create_plan(
        &[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)],
        vec![create_step((0.0, 0.0), (0.0, 0.002), Maneuver::Straight)],
    ))
    .unwrap()
}

/// A straight eastbound route along the equator with one point every
/// `spacing` degrees and one step per `points_per_step` points.
pub fn create_equator_route(n_points: usize, spacing: f64, points_per_step: usize) -> Route {
    let points = (0..n_points)
        .map(|i| (0.0, i as f64 * spacing))
        .collect::<Vec<_>>();

    let mut steps = Vec::new();
    let mut start = 0;
    while start < n_points - 1 {
        let end = (start + points_per_step).min(n_points - 1);
        steps.push(create_step(points[start], points[end], Maneuver::Straight));
        start = end;
    }

    Route::try_from(create_plan(&points, steps)).unwrap()
}
