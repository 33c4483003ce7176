use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// A single position sample from the fix source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Milliseconds since the Unix epoch, increasing between fixes
    pub timestamp_ms: i64,
    #[serde(default)]
    pub bearing: Option<f64>,
}

impl Fix {
    pub fn new(coordinate: Coordinate, timestamp_ms: i64) -> Self {
        Fix {
            coordinate,
            timestamp_ms,
            bearing: None,
        }
    }

    pub fn timestamp(&self) -> Result<Timestamp, jiff::Error> {
        Timestamp::from_millisecond(self.timestamp_ms)
    }
}
