use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinate { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl From<Coordinate> for geo_types::Point {
    fn from(value: Coordinate) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<&Coordinate> for geo_types::Point {
    fn from(value: &Coordinate) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<geo_types::Point> for Coordinate {
    fn from(value: geo_types::Point) -> Self {
        Coordinate {
            lat: value.y(),
            lng: value.x(),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
