use tracing::debug;

use crate::{
    config::TrackerParams,
    coordinate::Coordinate,
    geometry,
    route::Route,
    units::Meters,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Index of the matched route point, never below the previous match
    pub index: usize,
    /// Distance from the fix to the matched route point
    pub distance: Meters,
    pub widened: bool,
}

/// Maps fixes onto the route's point sequence without ever moving backward.
pub struct ProgressTracker {
    params: TrackerParams,
    index: usize,
}

impl ProgressTracker {
    pub fn new(params: TrackerParams) -> Self {
        ProgressTracker { params, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Matches `fix` against the route. `widen_threshold` is the match distance
    /// above which the forward window is widened once.
    pub fn update(&mut self, route: &Route, fix: &Coordinate, widen_threshold: Meters) -> Progress {
        let progress = locate(route, fix, self.index, &self.params, widen_threshold);
        self.index = progress.index;
        progress
    }
}

pub fn locate(
    route: &Route,
    fix: &Coordinate,
    last_index: usize,
    params: &TrackerParams,
    widen_threshold: Meters,
) -> Progress {
    let last_index = last_index.min(route.last_index());

    let (mut index, mut distance) = search_window(
        route,
        fix,
        last_index,
        params.window_back,
        params.window_forward,
    );
    let mut widened = false;

    if params.widen_on_jump && distance > widen_threshold {
        let forward = params.window_forward.saturating_mul(params.widen_factor.max(1));
        let (wide_index, wide_distance) =
            search_window(route, fix, last_index, params.window_back, forward);

        if wide_distance < distance {
            debug!(
                from = index,
                to = wide_index,
                "Widened progress window after a jump"
            );
            index = wide_index;
            distance = wide_distance;
            widened = true;
        }
    }

    if index < last_index {
        index = last_index;
        distance = geometry::distance(fix, &route.point(last_index).coordinate);
    }

    Progress {
        index,
        distance,
        widened,
    }
}

fn search_window(
    route: &Route,
    fix: &Coordinate,
    center: usize,
    back: usize,
    forward: usize,
) -> (usize, Meters) {
    let start = center.saturating_sub(back);
    let end = center.saturating_add(forward).min(route.last_index());

    route.points()[start..=end]
        .iter()
        .map(|point| (point.index, geometry::distance(fix, &point.coordinate)))
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .unwrap_or((center, Meters::ZERO))
}
