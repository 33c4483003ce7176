pub mod config;
pub mod coordinate;
pub mod driver;
pub mod error;
pub mod eta;
pub mod fix;
pub mod geometry;
pub mod off_route;
pub mod polyline;
pub mod progress;
pub mod route;
pub mod route_planner;
pub mod session;
pub mod speed;
pub mod steps;
pub mod transport_mode;
pub mod units;

#[cfg(test)]
pub(crate) mod test_utils;
