use geo::{Bearing, Distance, Haversine};

use crate::{coordinate::Coordinate, units::Meters};

pub(crate) const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates.
pub fn distance(a: &Coordinate, b: &Coordinate) -> Meters {
    let haversine = Haversine;
    Meters::new(haversine.distance(geo::Point::from(a), geo::Point::from(b)))
}

/// Initial bearing from `a` towards `b`, in degrees within `[0, 360)`.
pub fn bearing(a: &Coordinate, b: &Coordinate) -> f64 {
    let haversine = Haversine;
    let degrees = haversine
        .bearing(geo::Point::from(a), geo::Point::from(b))
        .rem_euclid(360.0);

    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if degrees >= 360.0 { 0.0 } else { degrees }
}

/// Shortest distance from `p` to the segment `a`-`b`.
///
/// Uses an equirectangular projection centered on `p`, which is accurate
/// enough at street scale.
pub fn distance_to_segment(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> Meters {
    let cos_lat = p.lat.to_radians().cos();

    let project = |c: &Coordinate| -> (f64, f64) {
        (
            (c.lng - p.lng).to_radians() * cos_lat * EARTH_RADIUS_METERS,
            (c.lat - p.lat).to_radians() * EARTH_RADIUS_METERS,
        )
    };

    let (ax, ay) = project(a);
    let (bx, by) = project(b);

    let dx = bx - ax;
    let dy = by - ay;
    let length_2 = dx * dx + dy * dy;

    // Degenerate segment
    if length_2 == 0.0 {
        return Meters::new((ax * ax + ay * ay).sqrt());
    }

    // p sits at the origin of the projection
    let t = (-(ax * dx + ay * dy) / length_2).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;

    Meters::new((cx * cx + cy * cy).sqrt())
}

/// Minimum distance from `p` to any segment of the polyline, `None` when the
/// polyline has fewer than two points.
pub fn distance_to_polyline<'a, I>(p: &Coordinate, points: I) -> Option<Meters>
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let mut points = points.into_iter();
    let mut previous = points.next()?;
    let mut best: Option<Meters> = None;

    for point in points {
        let d = distance_to_segment(p, previous, point);
        best = Some(match best {
            Some(current) => current.min(d),
            None => d,
        });
        previous = point;
    }

    best
}

/// Sum of the great-circle lengths of consecutive segments.
pub fn polyline_length<'a, I>(points: I) -> Meters
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return Meters::ZERO;
    };

    let mut length = Meters::ZERO;
    for point in points {
        length += distance(previous, point);
        previous = point;
    }

    length
}

/// Index of the point closest to `target`, `None` for an empty slice.
pub fn closest_point_index(points: &[Coordinate], target: &Coordinate) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| distance(target, a).cmp(&distance(target, b)))
        .map(|(index, _)| index)
}
