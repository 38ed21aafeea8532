//! Routing settings.

use serde::Deserialize;

/// Network-wide routing parameters.
///
/// Every boarding costs the same fixed wait and every bus moves at the
/// same velocity; the model is time-of-day-independent, so these two
/// numbers fully determine edge durations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RoutingSettings {
    /// Fixed wait before boarding at any stop, minutes.
    pub bus_wait_time: f64,
    /// Uniform bus speed, km/h.
    pub bus_velocity: f64,
}

/// A settings value that cannot produce a usable graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("bus_wait_time must be a positive number of minutes, got {0}")]
    NonPositiveWaitTime(f64),
    #[error("bus_velocity must be a positive number of km/h, got {0}")]
    NonPositiveVelocity(f64),
}

impl RoutingSettings {
    /// Construct validated settings.
    pub fn new(bus_wait_time: f64, bus_velocity: f64) -> Result<Self, SettingsError> {
        let settings = Self {
            bus_wait_time,
            bus_velocity,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Both fields must be finite and positive; NaN fails either check.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.bus_wait_time > 0.0) || !self.bus_wait_time.is_finite() {
            return Err(SettingsError::NonPositiveWaitTime(self.bus_wait_time));
        }
        if !(self.bus_velocity > 0.0) || !self.bus_velocity.is_finite() {
            return Err(SettingsError::NonPositiveVelocity(self.bus_velocity));
        }
        Ok(())
    }
}
