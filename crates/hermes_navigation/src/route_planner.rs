use std::future::Future;

use crate::{coordinate::Coordinate, route::Route, transport_mode::TransportMode};

/// The external routing service used for the initial plan and for reroutes.
pub trait RoutePlanner: Send + Sync + 'static {
    fn plan_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> impl Future<Output = anyhow::Result<Route>> + Send;
}
