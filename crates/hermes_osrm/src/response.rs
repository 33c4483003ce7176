use hermes_navigation::{
    coordinate::Coordinate,
    route::{Maneuver, PlannedStep, RoutePlan, StepGeometry},
};
use serde::Deserialize;

use crate::{client::OsrmError, instructions::instruction_text};

#[derive(Debug, Deserialize)]
pub struct OsrmRouteResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Distance in meters
    pub distance: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Encoded polyline, precision 5
    pub geometry: String,
    pub legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmLeg {
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmStep {
    pub distance: f64,
    pub duration: f64,
    pub geometry: String,
    #[serde(default)]
    pub name: String,
    pub maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
pub struct OsrmManeuver {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub modifier: Option<String>,
    /// `[lng, lat]`
    pub location: [f64; 2],
    #[serde(default)]
    pub exit: Option<u32>,
}

impl OsrmRouteResponse {
    /// Converts the first returned route into a plan.
    pub fn into_plan(self) -> Result<RoutePlan, OsrmError> {
        match self.code.as_str() {
            "Ok" => {}
            "NoRoute" => return Err(OsrmError::NoRoute),
            _ => {
                return Err(OsrmError::Api {
                    code: self.code,
                    message: self.message.unwrap_or_default(),
                });
            }
        }

        let route = self.routes.into_iter().next().ok_or(OsrmError::NoRoute)?;

        let steps = route
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|step| {
                let modifier = step.maneuver.modifier.as_deref();
                PlannedStep {
                    instruction: instruction_text(
                        &step.maneuver.kind,
                        modifier,
                        &step.name,
                        step.maneuver.exit,
                    ),
                    maneuver: Some(Maneuver::from_osrm(&step.maneuver.kind, modifier)),
                    geometry: step_geometry(step.geometry, &step.maneuver),
                    distance: step.distance,
                    duration: step.duration,
                }
            })
            .collect();

        Ok(RoutePlan {
            distance: route.distance,
            duration: route.duration,
            polyline: route.geometry,
            steps,
        })
    }
}

fn step_geometry(encoded: String, maneuver: &OsrmManeuver) -> StepGeometry {
    // Arrival steps may come without geometry
    if encoded.is_empty() {
        let location = Coordinate::new(maneuver.location[1], maneuver.location[0]);
        return StepGeometry::Endpoints {
            start: location,
            end: location,
        };
    }

    StepGeometry::Polyline(encoded)
}

#[cfg(test)]
mod tests {
    use hermes_navigation::route::Route;

    use super::*;

    const RESPONSE: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 222.4,
            "duration": 30.5,
            "geometry": "???gE?gE",
            "legs": [{
                "steps": [
                    {
                        "distance": 111.2,
                        "duration": 15.0,
                        "geometry": "???gE",
                        "name": "Rue de la Loi",
                        "maneuver": { "type": "depart", "location": [0.0, 0.0] }
                    },
                    {
                        "distance": 111.2,
                        "duration": 15.5,
                        "geometry": "?gE?gE",
                        "name": "",
                        "maneuver": { "type": "turn", "modifier": "slight left", "location": [0.001, 0.0] }
                    },
                    {
                        "distance": 0.0,
                        "duration": 0.0,
                        "geometry": "?oK",
                        "name": "",
                        "maneuver": { "type": "arrive", "location": [0.002, 0.0] }
                    }
                ]
            }]
        }]
    }"#;

    fn parse(json: &str) -> Result<RoutePlan, OsrmError> {
        serde_json::from_str::<OsrmRouteResponse>(json)
            .unwrap()
            .into_plan()
    }

    #[test]
    fn test_parse_route() {
        let plan = parse(RESPONSE).unwrap();

        assert_eq!(plan.distance, 222.4);
        assert_eq!(plan.duration, 30.5);
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[0].instruction, "Depart on Rue de la Loi");
        assert_eq!(plan.steps[1].instruction, "Turn slight left");
        assert_eq!(plan.steps[1].maneuver, Some(Maneuver::SlightLeft));
        assert_eq!(plan.steps[2].instruction, "Arrive at your destination");
    }

    #[test]
    fn test_plan_builds_route() {
        let route = Route::try_from(parse(RESPONSE).unwrap()).unwrap();

        assert_eq!(route.len(), 3);
        let ends = route
            .steps()
            .iter()
            .map(|step| step.end_point_index)
            .collect::<Vec<_>>();
        assert_eq!(ends, vec![1, 2, 2]);
        assert_eq!(route.steps()[2].end, Coordinate::new(0.0, 0.002));
    }

    #[test]
    fn test_no_route() {
        let json = r#"{ "code": "NoRoute", "message": "Impossible route between points", "routes": [] }"#;
        assert!(matches!(parse(json), Err(OsrmError::NoRoute)));
    }

    #[test]
    fn test_api_error() {
        let json = r#"{ "code": "InvalidQuery", "message": "Query string malformed" }"#;
        match parse(json) {
            Err(OsrmError::Api { code, message }) => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_missing_step_geometry_uses_maneuver_location() {
        let maneuver = OsrmManeuver {
            kind: String::from("arrive"),
            modifier: None,
            location: [4.35, 50.85],
            exit: None,
        };

        match step_geometry(String::new(), &maneuver) {
            StepGeometry::Endpoints { start, end } => {
                assert_eq!(start, Coordinate::new(50.85, 4.35));
                assert_eq!(end, start);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }
}
