use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::units::Kmh;

#[derive(Debug, Default, Deserialize, Serialize, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Car,
    Bike,
    Foot,
}

impl TransportMode {
    /// Speed assumed for ETAs when no usable speed estimate is available.
    pub fn default_speed(&self) -> Kmh {
        match self {
            TransportMode::Car => Kmh::new(40.0),
            TransportMode::Bike => Kmh::new(15.0),
            TransportMode::Foot => Kmh::new(5.0),
        }
    }
}

impl Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransportMode::Car => "car",
                TransportMode::Bike => "bike",
                TransportMode::Foot => "foot",
            }
        )
    }
}
