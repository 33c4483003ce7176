use std::ops::{Add, AddAssign, Div, Sub};

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Meters(f64);

impl Meters {
    pub const ZERO: Meters = Meters(0.0);

    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Meters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}m", self.0)
    }
}

impl Add for Meters {
    type Output = Meters;

    fn add(self, other: Meters) -> Meters {
        Meters(self.0 + other.0)
    }
}

impl AddAssign for Meters {
    fn add_assign(&mut self, other: Meters) {
        self.0 += other.0;
    }
}

impl Sub for Meters {
    type Output = Meters;

    fn sub(self, other: Meters) -> Meters {
        Meters(self.0 - other.0)
    }
}

impl Div<Kmh> for Meters {
    type Output = SignedDuration;

    /// Saturates at the duration bounds for very low speeds.
    fn div(self, speed: Kmh) -> SignedDuration {
        let seconds = self.0 * 3.6 / speed.value();
        SignedDuration::try_from_secs_f64(seconds).unwrap_or(if seconds < 0.0 {
            SignedDuration::MIN
        } else {
            SignedDuration::MAX
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Kmh(f64);

impl Kmh {
    pub fn new(value: f64) -> Self {
        Kmh(value)
    }

    pub fn from_meters_per_second(value: f64) -> Self {
        Kmh(value * 3.6)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn meters_per_second(&self) -> f64 {
        self.0 / 3.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_over_speed() {
        let duration = Meters::new(1000.0) / Kmh::new(36.0);
        assert_eq!(duration, SignedDuration::from_secs(100));
    }

    #[test]
    fn test_meters_over_tiny_speed_saturates() {
        let duration = Meters::new(150.0) / Kmh::new(1e-300);
        assert_eq!(duration, SignedDuration::MAX);
    }

    #[test]
    fn test_arithmetic_and_ordering() {
        let mut total = Meters::new(10.0) + Meters::new(5.5);
        total += Meters::new(0.5);
        assert_eq!(total - Meters::new(6.0), Meters::new(10.0));
        assert!(Meters::new(1.0) < Meters::new(2.0));
    }

    #[test]
    fn test_kmh_conversion() {
        let speed = Kmh::from_meters_per_second(10.0);
        assert_eq!(speed.value(), 36.0);
        assert!((speed.meters_per_second() - 10.0).abs() < 1e-9);
    }
}
