use crate::{config::SpeedParams, fix::Fix, geometry, units::Kmh};

/// Exponential moving average of the speed implied by consecutive fixes.
pub struct SpeedEstimator {
    params: SpeedParams,
    previous: Option<Fix>,
    // m/s
    average: Option<f64>,
}

impl SpeedEstimator {
    pub fn new(params: SpeedParams) -> Self {
        SpeedEstimator {
            params,
            previous: None,
            average: None,
        }
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.average = None;
    }

    pub fn record(&mut self, fix: &Fix) {
        if let Some(previous) = self.previous {
            let elapsed_ms = fix.timestamp_ms - previous.timestamp_ms;

            // Out-of-order or duplicated timestamps carry no speed information
            if elapsed_ms <= 0 {
                return;
            }

            let meters = geometry::distance(&previous.coordinate, &fix.coordinate).value();
            let sample = meters / (elapsed_ms as f64 / 1000.0);

            self.average = Some(match self.average {
                Some(average) => {
                    self.params.smoothing * sample + (1.0 - self.params.smoothing) * average
                }
                None => sample,
            });
        }

        self.previous = Some(*fix);
    }

    /// The current estimate, `None` while it is too low to be trusted.
    pub fn estimate(&self) -> Option<Kmh> {
        self.average
            .filter(|speed| speed.is_finite() && *speed >= self.params.min_trusted_speed)
            .map(Kmh::from_meters_per_second)
    }
}
