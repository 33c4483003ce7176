use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    coordinate::Coordinate,
    geometry,
    polyline::{self, PolylineError},
    units::{Kmh, Meters},
};

pub const DEFAULT_STEP_MATCH_TOLERANCE: Meters = Meters::new(30.0);

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Invalid route polyline: {0}")]
    Polyline(#[from] PolylineError),

    #[error("Invalid polyline for step {step}: {source}")]
    StepPolyline {
        step: usize,
        #[source]
        source: PolylineError,
    },

    #[error("A route needs at least 2 points, got {0}")]
    NotEnoughPoints(usize),

    #[error("A route needs at least 1 step")]
    NoSteps,

    #[error("Step {0} has no coordinates")]
    EmptyStep(usize),

    #[error("Duration of {seconds}s is out of range")]
    InvalidDuration {
        /// `None` for the route's total duration
        step: Option<usize>,
        seconds: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maneuver {
    Straight,
    TurnLeft,
    TurnRight,
    SlightLeft,
    SlightRight,
    Unknown,
}

impl Maneuver {
    /// Maps OSRM's `maneuver.type` / `maneuver.modifier` pair.
    pub fn from_osrm(kind: &str, modifier: Option<&str>) -> Self {
        match (kind, modifier) {
            ("depart" | "arrive", _) => Maneuver::Straight,
            (_, Some("straight")) => Maneuver::Straight,
            (_, Some("left" | "sharp left")) => Maneuver::TurnLeft,
            (_, Some("right" | "sharp right")) => Maneuver::TurnRight,
            (_, Some("slight left")) => Maneuver::SlightLeft,
            (_, Some("slight right")) => Maneuver::SlightRight,
            ("continue" | "new name" | "notification", None) => Maneuver::Straight,
            _ => Maneuver::Unknown,
        }
    }

    /// Classifies a heading change in degrees, positive turning right.
    pub fn from_turn_angle(angle: f64) -> Self {
        let mut angle = angle % 360.0;
        if angle > 180.0 {
            angle -= 360.0;
        } else if angle < -180.0 {
            angle += 360.0;
        }

        let abs_angle = angle.abs();
        if abs_angle > 170.0 {
            Maneuver::Unknown
        } else if abs_angle > 60.0 {
            if angle > 0.0 {
                Maneuver::TurnRight
            } else {
                Maneuver::TurnLeft
            }
        } else if abs_angle > 20.0 {
            if angle > 0.0 {
                Maneuver::SlightRight
            } else {
                Maneuver::SlightLeft
            }
        } else {
            Maneuver::Straight
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepGeometry {
    Polyline(String),
    Endpoints { start: Coordinate, end: Coordinate },
}

/// A maneuver as returned by a routing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedStep {
    pub instruction: String,
    #[serde(default)]
    pub maneuver: Option<Maneuver>,
    pub geometry: StepGeometry,
    /// Distance in meters
    pub distance: f64,
    /// Duration in seconds
    pub duration: f64,
}

/// A planned route as returned by a routing service, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Total distance in meters
    pub distance: f64,
    /// Total duration in seconds
    pub duration: f64,
    pub polyline: String,
    pub steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePoint {
    pub index: usize,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStep {
    pub instruction: String,
    pub maneuver: Maneuver,
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance: Meters,
    pub duration: SignedDuration,
    /// Index of the route point matched to `end`
    pub end_point_index: usize,
}

/// An immutable planned route. Rerouting replaces the whole value.
#[derive(Debug, Clone)]
pub struct Route {
    points: Vec<RoutePoint>,
    // Polyline length from the first point up to each point
    cumulative: Vec<Meters>,
    steps: Vec<NavigationStep>,
    distance: Meters,
    duration: SignedDuration,
    polyline: String,
}

impl TryFrom<RoutePlan> for Route {
    type Error = RouteError;

    fn try_from(plan: RoutePlan) -> Result<Self, Self::Error> {
        Route::new(plan, DEFAULT_STEP_MATCH_TOLERANCE)
    }
}

impl Route {
    pub fn new(plan: RoutePlan, step_match_tolerance: Meters) -> Result<Self, RouteError> {
        let coordinates = polyline::decode(&plan.polyline)?;

        if coordinates.len() < 2 {
            return Err(RouteError::NotEnoughPoints(coordinates.len()));
        }

        if plan.steps.is_empty() {
            return Err(RouteError::NoSteps);
        }

        let mut cumulative = Vec::with_capacity(coordinates.len());
        let mut length = Meters::ZERO;
        cumulative.push(length);
        for window in coordinates.windows(2) {
            length += geometry::distance(&window[0], &window[1]);
            cumulative.push(length);
        }

        let endpoints = plan
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| step_endpoints(index, &step.geometry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut steps = Vec::with_capacity(plan.steps.len());
        let mut match_from = 0;

        for (index, step) in plan.steps.into_iter().enumerate() {
            let ends = &endpoints[index];
            let (end_point_index, match_distance) =
                match_end_point(&coordinates, match_from, &ends.end);

            if match_distance > step_match_tolerance {
                warn!(
                    step = index,
                    distance = %match_distance,
                    "Step end point is far from the route geometry, using nearest point"
                );
            }

            match_from = end_point_index;

            let maneuver = step.maneuver.unwrap_or_else(|| match index {
                0 => Maneuver::Straight,
                _ => match (endpoints[index - 1].headings, ends.headings) {
                    (Some((_, previous_exit)), Some((entry, _))) => {
                        Maneuver::from_turn_angle(entry - previous_exit)
                    }
                    _ => Maneuver::Unknown,
                },
            });

            steps.push(NavigationStep {
                instruction: step.instruction,
                maneuver,
                start: ends.start,
                end: ends.end,
                distance: Meters::new(step.distance),
                duration: non_negative_duration(step.duration, Some(index))?,
                end_point_index,
            });
        }

        let duration = non_negative_duration(plan.duration, None)?;

        debug!(
            points = coordinates.len(),
            steps = steps.len(),
            length = %length,
            "Built route"
        );

        Ok(Route {
            points: coordinates
                .into_iter()
                .enumerate()
                .map(|(index, coordinate)| RoutePoint { index, coordinate })
                .collect(),
            cumulative,
            steps,
            distance: Meters::new(plan.distance),
            duration,
            polyline: plan.polyline,
        })
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> + '_ {
        self.points.iter().map(|point| &point.coordinate)
    }

    pub fn point(&self, index: usize) -> &RoutePoint {
        &self.points[index]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    pub fn steps(&self) -> &[NavigationStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&NavigationStep> {
        self.steps.get(index)
    }

    pub fn last_step_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// Total distance reported by the routing service
    pub fn distance(&self) -> Meters {
        self.distance
    }

    /// Total duration reported by the routing service
    pub fn duration(&self) -> SignedDuration {
        self.duration
    }

    /// Geometric length of the decoded polyline
    pub fn length(&self) -> Meters {
        self.cumulative[self.cumulative.len() - 1]
    }

    pub fn polyline(&self) -> &str {
        &self.polyline
    }

    pub fn origin(&self) -> Coordinate {
        self.points[0].coordinate
    }

    pub fn destination(&self) -> Coordinate {
        self.points[self.points.len() - 1].coordinate
    }

    /// Polyline length from the point at `index` to the end of the route.
    pub fn length_from(&self, index: usize) -> Meters {
        let index = index.min(self.last_index());
        self.length() - self.cumulative[index]
    }

    pub fn passed(&self, index: usize) -> &[RoutePoint] {
        &self.points[..index.min(self.points.len())]
    }

    pub fn remaining(&self, index: usize) -> &[RoutePoint] {
        &self.points[index.min(self.points.len())..]
    }

    pub fn average_speed(&self) -> Option<Kmh> {
        let seconds = self.duration.as_secs_f64();
        if seconds <= 0.0 || self.distance.is_zero() {
            return None;
        }

        Some(Kmh::from_meters_per_second(self.distance.value() / seconds))
    }
}

struct StepEnds {
    start: Coordinate,
    end: Coordinate,
    // Entry and exit headings, when the geometry has a direction
    headings: Option<(f64, f64)>,
}

fn step_endpoints(index: usize, geometry: &StepGeometry) -> Result<StepEnds, RouteError> {
    match geometry {
        StepGeometry::Polyline(encoded) => {
            let coordinates = polyline::decode(encoded)
                .map_err(|source| RouteError::StepPolyline { step: index, source })?;

            let (Some(&start), Some(&end)) = (coordinates.first(), coordinates.last()) else {
                return Err(RouteError::EmptyStep(index));
            };

            let headings = (coordinates.len() >= 2).then(|| {
                let n = coordinates.len();
                (
                    geometry::bearing(&coordinates[0], &coordinates[1]),
                    geometry::bearing(&coordinates[n - 2], &coordinates[n - 1]),
                )
            });

            Ok(StepEnds {
                start,
                end,
                headings,
            })
        }
        StepGeometry::Endpoints { start, end } => {
            let headings = (start != end).then(|| {
                let heading = geometry::bearing(start, end);
                (heading, heading)
            });

            Ok(StepEnds {
                start: *start,
                end: *end,
                headings,
            })
        }
    }
}

fn non_negative_duration(seconds: f64, step: Option<usize>) -> Result<SignedDuration, RouteError> {
    SignedDuration::try_from_secs_f64(seconds.max(0.0))
        .map_err(|_| RouteError::InvalidDuration { step, seconds })
}

fn match_end_point(coordinates: &[Coordinate], from: usize, end: &Coordinate) -> (usize, Meters) {
    let remaining = coordinates.get(from..).unwrap_or_default();

    match geometry::closest_point_index(remaining, end) {
        Some(offset) => {
            let index = from + offset;
            (index, geometry::distance(end, &coordinates[index]))
        }
        None => (from, Meters::ZERO),
    }
}
