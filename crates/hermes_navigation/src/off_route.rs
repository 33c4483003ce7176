use tracing::{debug, info};

use crate::{
    config::OffRouteParams, coordinate::Coordinate, geometry, route::Route, units::Meters,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerouteState {
    OnRoute,
    /// Off-route fixes are accumulating but have not triggered yet
    Suspect,
    /// A reroute request is in flight
    Rerouting,
    /// A recent reroute suppresses new requests
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffRouteStatus {
    pub distance_to_route: Meters,
    pub off_route: bool,
    pub consecutive: u32,
    /// A reroute must be requested for this fix
    pub trigger: bool,
    pub state: RerouteState,
}

/// Debounced off-route detection with a reroute cooldown.
pub struct OffRouteDetector {
    params: OffRouteParams,
    consecutive: u32,
    rerouting: bool,
    last_reroute_ms: Option<i64>,
}

impl OffRouteDetector {
    pub fn new(params: OffRouteParams) -> Self {
        OffRouteDetector {
            params,
            consecutive: 0,
            rerouting: false,
            last_reroute_ms: None,
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn is_rerouting(&self) -> bool {
        self.rerouting
    }

    pub fn state(&self, now_ms: i64) -> RerouteState {
        if self.rerouting {
            RerouteState::Rerouting
        } else if self.consecutive > 0 {
            RerouteState::Suspect
        } else if !self.cooldown_elapsed(now_ms) {
            RerouteState::Cooldown
        } else {
            RerouteState::OnRoute
        }
    }

    pub fn distance_to_route(route: &Route, fix: &Coordinate) -> Meters {
        // A route always has at least two points
        geometry::distance_to_polyline(fix, route.coordinates()).unwrap_or(Meters::ZERO)
    }

    pub fn evaluate(&mut self, route: &Route, fix: &Coordinate, now_ms: i64) -> OffRouteStatus {
        self.observe(Self::distance_to_route(route, fix), now_ms)
    }

    pub fn observe(&mut self, distance_to_route: Meters, now_ms: i64) -> OffRouteStatus {
        let off_route = distance_to_route > self.params.threshold;
        let mut trigger = false;

        if off_route {
            self.consecutive += 1;

            if self.consecutive >= self.params.confirmations
                && !self.rerouting
                && self.cooldown_elapsed(now_ms)
            {
                info!(
                    distance = %distance_to_route,
                    consecutive = self.consecutive,
                    "Off route, requesting a new route"
                );
                trigger = true;
                self.rerouting = true;
                self.consecutive = 0;
                self.last_reroute_ms = Some(now_ms);
            } else {
                debug!(
                    distance = %distance_to_route,
                    consecutive = self.consecutive,
                    rerouting = self.rerouting,
                    "Off route fix"
                );
            }
        } else {
            self.consecutive = 0;
        }

        OffRouteStatus {
            distance_to_route,
            off_route,
            consecutive: self.consecutive,
            trigger,
            state: self.state(now_ms),
        }
    }

    /// A new route was installed: the off-route history belongs to the old one.
    pub fn reroute_succeeded(&mut self, now_ms: i64) {
        self.rerouting = false;
        self.consecutive = 0;
        self.last_reroute_ms = Some(now_ms);
    }

    /// Keeps the counter so a retry happens once the cooldown has elapsed.
    pub fn reroute_failed(&mut self) {
        self.rerouting = false;
    }

    fn cooldown_elapsed(&self, now_ms: i64) -> bool {
        match self.last_reroute_ms {
            Some(last) => {
                now_ms.saturating_sub(last) >= self.params.cooldown.as_millis() as i64
            }
            None => true,
        }
    }
}
