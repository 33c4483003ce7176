use jiff::{SignedDuration, Timestamp};

use crate::{
    coordinate::Coordinate,
    geometry,
    route::Route,
    transport_mode::TransportMode,
    units::{Kmh, Meters},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eta {
    pub remaining_distance: Meters,
    pub remaining_duration: SignedDuration,
    pub arrival: Timestamp,
    pub speed: Kmh,
}

/// Uses the measured speed when there is one, the mode's default otherwise.
pub fn effective_speed(estimate: Option<Kmh>, mode: TransportMode) -> Kmh {
    estimate.unwrap_or_else(|| mode.default_speed())
}

/// Remaining distance is the gap from the fix to the matched route point plus
/// the polyline length from that point to the destination. Durations and
/// arrival saturate instead of overflowing when the speed is close to zero.
pub fn summarize(
    route: &Route,
    point_index: usize,
    fix: &Coordinate,
    now: Timestamp,
    speed: Kmh,
) -> Eta {
    let index = point_index.min(route.last_index());
    let remaining_distance =
        geometry::distance(fix, &route.point(index).coordinate) + route.length_from(index);

    let remaining_duration = if speed.value().is_finite() && speed.value() > 0.0 {
        remaining_distance / speed
    } else {
        SignedDuration::ZERO
    };

    let arrival = now
        .checked_add(remaining_duration)
        .unwrap_or(Timestamp::MAX);

    Eta {
        remaining_distance,
        remaining_duration,
        arrival,
        speed,
    }
}
