//! Three component vector used for positions, fields and forces.
//!
//! [`Vector`] is a thin value type over [`glam::DVec3`]. Equality is exact
//! per component; field symmetry checks elsewhere in the crate rely on it.

use crate::error::{DepError, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(DVec3);

impl Vector {
    pub const ZERO: Self = Self(DVec3::ZERO);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    /// A vector with the same value in every component
    pub const fn splat(value: f64) -> Self {
        Self(DVec3::splat(value))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn set_x(&mut self, x: f64) {
        self.0.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.0.y = y;
    }

    pub fn set_z(&mut self, z: f64) {
        self.0.z = z;
    }

    pub fn set_all(&mut self, x: f64, y: f64, z: f64) {
        self.0 = DVec3::new(x, y, z);
    }

    /// Add separate amounts to each component
    pub fn add_xyz(self, x: f64, y: f64, z: f64) -> Self {
        Self(self.0 + DVec3::new(x, y, z))
    }

    /// Subtract separate amounts from each component
    pub fn sub_xyz(self, x: f64, y: f64, z: f64) -> Self {
        Self(self.0 - DVec3::new(x, y, z))
    }

    /// Multiply each component by its own factor
    pub fn mult_xyz(self, x: f64, y: f64, z: f64) -> Self {
        Self(self.0 * DVec3::new(x, y, z))
    }

    pub fn magnitude(&self) -> f64 {
        self.0.length()
    }

    /// Euclidean distance between two points
    pub fn distance(&self, other: &Vector) -> f64 {
        self.0.distance(other.0)
    }

    /// Unit vector pointing the same way as `self`.
    ///
    /// Fails with [`DepError::ZeroLengthVector`] when the magnitude is zero.
    pub fn unit(&self) -> Result<Vector> {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Err(DepError::ZeroLengthVector);
        }
        Ok(Self(self.0 / magnitude))
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn to_array(&self) -> [f64; 3] {
        self.0.to_array()
    }

    /// True when every component of `self` is strictly below the matching component of `other`
    pub fn all_less_than(&self, other: &Vector) -> bool {
        self.0.cmplt(other.0).all()
    }
}

impl From<DVec3> for Vector {
    fn from(value: DVec3) -> Self {
        Self(value)
    }
}

impl From<Vector> for DVec3 {
    fn from(value: Vector) -> Self {
        value.0
    }
}

impl From<[f64; 3]> for Vector {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.0 += rhs.0;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(self, rhs: f64) -> Vector {
        Self(self.0 / rhs)
    }
}

/// Component-wise product
impl Mul<Vector> for Vector {
    type Output = Vector;

    fn mul(self, rhs: Vector) -> Vector {
        Self(self.0 * rhs.0)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Self(-self.0)
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:e}, {:e}, {:e})", self.x(), self.y(), self.z())
    }
}
