//! Engine start-up configuration.
//!
//! [`EngineConfig`] holds fully constructed values: picking a medium or an
//! electrode by name happens in front ends before they reach this type.
//!
//! The defaults describe a 150 µm cube of deionized water filled to half
//! height, driven at 1 kHz by an uncharged dipole lying along x at mid
//! depth, stepped every 50 ms.

use crate::bounds::Bounds;
use crate::electrode::{Dipole, Electrode};
use crate::error::{DepError, Result};
use crate::medium::{Medium, MediumKind};
use crate::particle::check_frequency;
use crate::vector::Vector;
use std::time::Duration;

/// Edge length of the default container, m
pub const DEFAULT_BOUND: f64 = 150.0e-6;

/// Drive frequency of a new engine, Hz
pub const DEFAULT_FREQUENCY: f64 = 1000.0;

/// Simulated time per step at 1× speed, s
pub const DEFAULT_TIME_STEP: f64 = 0.05;

/// Wall-clock time between stepper ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bounds: Bounds,
    pub medium: Medium,
    pub frequency: f64,
    pub electrode: Electrode,
    /// Simulated seconds per step at 1× speed
    pub base_time_step: f64,
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::from_ordered(Vector::ZERO, Vector::splat(DEFAULT_BOUND)),
            medium: Medium::from_kind(MediumKind::DeionizedWater).with_level(DEFAULT_BOUND / 2.0),
            frequency: DEFAULT_FREQUENCY,
            electrode: Electrode::Dipole(Dipole::new(
                0.0,
                Vector::new(DEFAULT_BOUND / 5.0, 0.0, DEFAULT_BOUND / 2.0),
                Vector::new(DEFAULT_BOUND * 4.0 / 5.0, 0.0, DEFAULT_BOUND / 2.0),
            )),
            base_time_step: DEFAULT_TIME_STEP,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl EngineConfig {
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_electrode(mut self, electrode: impl Into<Electrode>) -> Self {
        self.electrode = electrode.into();
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Check the numeric fields that [`Bounds`] does not already guard
    pub fn validate(&self) -> Result<()> {
        check_frequency(self.frequency)?;
        if !self.base_time_step.is_finite() || self.base_time_step <= 0.0 {
            return Err(DepError::invalid_argument(format!(
                "time step must be positive, got {}",
                self.base_time_step
            )));
        }
        if self.tick_interval.is_zero() {
            return Err(DepError::invalid_argument("tick interval must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bounds.center(), Vector::splat(DEFAULT_BOUND / 2.0));
        assert_eq!(config.medium.level(), DEFAULT_BOUND / 2.0);
    }

    #[test]
    fn rejects_negative_frequency() {
        let config = EngineConfig {
            frequency: -1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DepError::InvalidArgument { .. })
        ));
    }
}
