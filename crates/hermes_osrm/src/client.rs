use hermes_navigation::{
    coordinate::Coordinate,
    route::{Route, RoutePlan},
    route_planner::RoutePlanner,
    transport_mode::TransportMode,
    units::Meters,
};
use thiserror::Error;
use tracing::debug;

use crate::response::OsrmRouteResponse;

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("OSRM error: {code} - {message}")]
    Api { code: String, message: String },

    #[error("No route found")]
    NoRoute,
}

pub struct OsrmRouteClientParams {
    pub osrm_url: String,
    pub step_match_tolerance: Meters,
}

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/";

pub fn osrm_profile(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Car => "driving",
        TransportMode::Bike => "cycling",
        TransportMode::Foot => "walking",
    }
}

pub struct OsrmRouteClient {
    params: OsrmRouteClientParams,
    client: reqwest::Client,
}

impl OsrmRouteClient {
    pub fn new(params: OsrmRouteClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub fn route_url(&self, points: &[Coordinate], mode: TransportMode) -> String {
        let mut url = self.params.osrm_url.trim_end_matches('/').to_string();
        url.push_str(OSRM_ROUTE_API_PATH);
        url.push_str(osrm_profile(mode));
        url.push('/');

        let coordinates = points
            .iter()
            .map(|coordinate| {
                let point: geo_types::Point = coordinate.into();
                format!("{},{}", point.x(), point.y())
            })
            .collect::<Vec<_>>()
            .join(";");
        url.push_str(&coordinates);

        url
    }

    pub async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<RoutePlan, OsrmError> {
        let url = self.route_url(&[origin, destination], mode);

        debug!("OSRM: Requesting route {}", url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("overview", "full"),
                ("geometries", "polyline"),
                ("steps", "true"),
            ])
            .send()
            .await?;

        // Errors such as NoRoute come back as JSON with a non-2xx status
        let bytes = response.bytes().await?;
        let response: OsrmRouteResponse = serde_json::from_slice(&bytes)?;

        response.into_plan()
    }
}

impl RoutePlanner for OsrmRouteClient {
    async fn plan_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> anyhow::Result<Route> {
        let plan = self.fetch_route(origin, destination, mode).await?;
        let route = Route::new(plan, self.params.step_match_tolerance)?;

        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url() {
        let client = OsrmRouteClient::new(OsrmRouteClientParams {
            osrm_url: String::from("http://localhost:5000/"),
            step_match_tolerance: Meters::new(30.0),
        });

        let url = client.route_url(
            &[Coordinate::new(50.85, 4.35), Coordinate::new(51.2, 4.4)],
            TransportMode::Bike,
        );

        assert_eq!(
            url,
            "http://localhost:5000/route/v1/cycling/4.35,50.85;4.4,51.2"
        );

        assert_eq!(
            client.route_url(&[], TransportMode::Car),
            "http://localhost:5000/route/v1/driving/"
        );
    }
}
