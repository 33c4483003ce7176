use tracing::{debug, info};

use crate::{
    coordinate::Coordinate,
    geometry,
    route::{NavigationStep, Route},
    units::Meters,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Unchanged,
    Advanced { from: usize, to: usize },
    /// The last step's end point was reached
    Arrived,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepProgress {
    pub event: StepEvent,
    pub index: usize,
    /// Distance from the fix to the end of the (new) current step
    pub distance_to_step_end: Meters,
}

/// Tracks the active maneuver. Steps only ever move forward.
pub struct StepNavigator {
    completion_radius: Meters,
    index: usize,
    arrived: bool,
}

impl StepNavigator {
    pub fn new(completion_radius: Meters) -> Self {
        StepNavigator {
            completion_radius,
            index: 0,
            arrived: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.arrived = false;
    }

    pub fn current_step<'a>(&self, route: &'a Route) -> &'a NavigationStep {
        &route.steps()[self.index.min(route.last_step_index())]
    }

    pub fn next_step<'a>(&self, route: &'a Route) -> Option<&'a NavigationStep> {
        route.step(self.index + 1)
    }

    pub fn update(&mut self, route: &Route, fix: &Coordinate) -> StepProgress {
        let from = self.index;
        let mut event = StepEvent::Unchanged;
        let mut distance_to_step_end = geometry::distance(fix, &self.current_step(route).end);

        while !self.arrived && distance_to_step_end <= self.completion_radius {
            if self.index >= route.last_step_index() {
                info!(step = self.index, "Reached the end of the last step");
                self.arrived = true;
                event = StepEvent::Arrived;
                break;
            }

            self.index += 1;
            event = StepEvent::Advanced {
                from,
                to: self.index,
            };
            distance_to_step_end = geometry::distance(fix, &self.current_step(route).end);
        }

        if let StepEvent::Advanced { from, to } = event {
            debug!(from, to, "Advanced to next step");
        }

        StepProgress {
            event,
            index: self.index,
            distance_to_step_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        route::Maneuver,
        test_utils::{create_equator_route, create_plan, create_step, create_three_point_route},
    };

    #[test]
    fn test_stays_on_step_outside_radius() {
        let route = create_equator_route(11, 0.001, 5);
        let mut navigator = StepNavigator::new(Meters::new(50.0));

        let progress = navigator.update(&route, &Coordinate::new(0.0, 0.002));
        assert_eq!(progress.event, StepEvent::Unchanged);
        assert_eq!(progress.index, 0);
        assert!((progress.distance_to_step_end.value() - 333.58).abs() < 0.1);
    }

    #[test]
    fn test_advances_within_radius() {
        let route = create_equator_route(11, 0.001, 5);
        let mut navigator = StepNavigator::new(Meters::new(50.0));

        let progress = navigator.update(&route, &Coordinate::new(0.0, 0.0048));
        assert_eq!(progress.event, StepEvent::Advanced { from: 0, to: 1 });
        assert_eq!(navigator.current_step(&route).end, Coordinate::new(0.0, 0.01));
        assert!(navigator.next_step(&route).is_none());
    }

    #[test]
    fn test_never_reverts() {
        let route = create_equator_route(11, 0.001, 5);
        let mut navigator = StepNavigator::new(Meters::new(50.0));

        navigator.update(&route, &Coordinate::new(0.0, 0.005));
        assert_eq!(navigator.index(), 1);

        // Drift back within radius of the first step's end
        let progress = navigator.update(&route, &Coordinate::new(0.0, 0.0049));
        assert_eq!(progress.event, StepEvent::Unchanged);
        assert_eq!(navigator.index(), 1);

        navigator.update(&route, &Coordinate::new(0.0, 0.0));
        assert_eq!(navigator.index(), 1);
    }

    #[test]
    fn test_skips_several_short_steps() {
        let plan = create_plan(
            &[(0.0, 0.0), (0.0, 0.0001), (0.0, 0.0002), (0.0, 0.002)],
            vec![
                create_step((0.0, 0.0), (0.0, 0.0001), Maneuver::Straight),
                create_step((0.0, 0.0001), (0.0, 0.0002), Maneuver::SlightLeft),
                create_step((0.0, 0.0002), (0.0, 0.002), Maneuver::TurnRight),
            ],
        );
        let route = Route::try_from(plan).unwrap();
        let mut navigator = StepNavigator::new(Meters::new(50.0));

        let progress = navigator.update(&route, &Coordinate::new(0.0, 0.00015));
        assert_eq!(progress.event, StepEvent::Advanced { from: 0, to: 2 });
        assert_eq!(navigator.current_step(&route).maneuver, Maneuver::TurnRight);
    }

    #[test]
    fn test_arrival_on_last_step_end() {
        let route = create_three_point_route();
        let mut navigator = StepNavigator::new(Meters::new(50.0));

        assert_eq!(
            navigator.update(&route, &Coordinate::new(0.0, 0.0015)).event,
            StepEvent::Unchanged
        );

        let progress = navigator.update(&route, &Coordinate::new(0.0, 0.002));
        assert_eq!(progress.event, StepEvent::Arrived);
        assert!(navigator.has_arrived());
        assert!(progress.distance_to_step_end.is_zero());
    }

    #[test]
    fn test_reset() {
        let route = create_equator_route(11, 0.001, 5);
        let mut navigator = StepNavigator::new(Meters::new(50.0));
        navigator.update(&route, &Coordinate::new(0.0, 0.005));

        navigator.reset();
        assert_eq!(navigator.index(), 0);
        assert!(!navigator.has_arrived());
    }
}
