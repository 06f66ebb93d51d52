//! The rectangular container particles are confined to.

use crate::error::{DepError, Result};
use crate::vector::Vector;

/// Axis-aligned box with `low < high` on every axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    low: Vector,
    high: Vector,
}

impl Bounds {
    pub fn new(low: Vector, high: Vector) -> Result<Self> {
        if !low.all_less_than(&high) {
            return Err(DepError::invalid_argument(format!(
                "low bounds {} must be below high bounds {} on every axis",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Caller guarantees `low < high` on every axis
    pub(crate) const fn from_ordered(low: Vector, high: Vector) -> Self {
        Self { low, high }
    }

    pub fn low(&self) -> Vector {
        self.low
    }

    pub fn high(&self) -> Vector {
        self.high
    }

    /// Replace the low corner, keeping the box unchanged on rejection
    pub fn set_low(&mut self, low: Vector) -> Result<()> {
        *self = Self::new(low, self.high)?;
        Ok(())
    }

    /// Replace the high corner, keeping the box unchanged on rejection
    pub fn set_high(&mut self, high: Vector) -> Result<()> {
        *self = Self::new(self.low, high)?;
        Ok(())
    }

    /// Geometric center of the box
    pub fn center(&self) -> Vector {
        (self.low + self.high) * 0.5
    }

    /// Pull a sphere of `radius` at `position` back inside the box.
    ///
    /// Each axis is handled on its own: below `low` it lands at
    /// `low + radius`, above `high` at `high - radius`, otherwise it is
    /// untouched.
    pub fn clamp(&self, position: Vector, radius: f64) -> Vector {
        let axis = |value: f64, low: f64, high: f64| {
            if value < low {
                low + radius
            } else if value > high {
                high - radius
            } else {
                value
            }
        };

        Vector::new(
            axis(position.x(), self.low.x(), self.high.x()),
            axis(position.y(), self.low.y(), self.high.y()),
            axis(position.z(), self.low.z(), self.high.z()),
        )
    }
}
