use std::io::Read;

use jiff::SignedDuration;
use serde::Deserialize;

use crate::{route::DEFAULT_STEP_MATCH_TOLERANCE, transport_mode::TransportMode, units::Meters};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Route points searched behind the last matched index
    pub window_back: usize,
    /// Route points searched ahead of the last matched index
    pub window_forward: usize,
    /// Retry once with a wider forward window when the best match is
    /// farther than the off-route threshold
    pub widen_on_jump: bool,
    pub widen_factor: usize,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            window_back: 10,
            window_forward: 50,
            widen_on_jump: true,
            widen_factor: 4,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OffRouteParams {
    pub threshold: Meters,
    /// Consecutive off-route fixes needed before rerouting
    pub confirmations: u32,
    /// Minimum time between two reroute requests
    pub cooldown: SignedDuration,
}

impl Default for OffRouteParams {
    fn default() -> Self {
        Self {
            threshold: Meters::new(50.0),
            confirmations: 3,
            cooldown: SignedDuration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SpeedParams {
    /// Weight of the newest sample in the moving average
    pub smoothing: f64,
    /// Estimates below this speed (m/s) fall back to the transport mode default
    pub min_trusted_speed: f64,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            smoothing: 0.3,
            min_trusted_speed: 0.5,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub tracker: TrackerParams,
    /// Distance to a step's end point at which the step counts as done
    pub step_completion_radius: Meters,
    /// Step end points farther than this from the route geometry are logged
    pub step_match_tolerance: Meters,
    pub off_route: OffRouteParams,
    pub transport_mode: TransportMode,
    pub speed: SpeedParams,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerParams::default(),
            step_completion_radius: Meters::new(50.0),
            step_match_tolerance: DEFAULT_STEP_MATCH_TOLERANCE,
            off_route: OffRouteParams::default(),
            transport_mode: TransportMode::default(),
            speed: SpeedParams::default(),
        }
    }
}

impl NavigationConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}
