//! Suspending fluids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dielectric and physical description of the fluid particles float in
#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    permittivity: f64,
    conductivity: f64,
    density: f64,
    level: f64,
}

impl Medium {
    /// `permittivity` is relative, `conductivity` in S/m, `density` in kg/m³
    pub fn new(permittivity: f64, conductivity: f64, density: f64) -> Self {
        Self {
            permittivity,
            conductivity,
            density,
            level: 0.0,
        }
    }

    pub fn from_kind(kind: MediumKind) -> Self {
        let constants = kind.constants();
        Self::new(
            constants.permittivity,
            constants.conductivity,
            constants.density,
        )
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn permittivity(&self) -> f64 {
        self.permittivity
    }

    pub fn conductivity(&self) -> f64 {
        self.conductivity
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Fill level in m
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn set_level(&mut self, level: f64) {
        self.level = level;
    }
}

/// Constants of one fluid species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediumConstants {
    pub permittivity: f64,
    pub conductivity: f64,
    pub density: f64,
}

/// Fluids with tabulated constants at 20 °C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediumKind {
    Water,
    DistilledWater,
    DeionizedWater,
}

impl MediumKind {
    pub const ALL: [MediumKind; 3] = [
        MediumKind::Water,
        MediumKind::DistilledWater,
        MediumKind::DeionizedWater,
    ];

    pub fn constants(self) -> MediumConstants {
        match self {
            MediumKind::Water => MediumConstants {
                permittivity: 80.1,
                conductivity: 0.0275,
                density: 998.23,
            },
            MediumKind::DistilledWater => MediumConstants {
                permittivity: 80.1,
                conductivity: 5.5e-6,
                density: 998.2,
            },
            // Density borrowed from distilled water
            MediumKind::DeionizedWater => MediumConstants {
                permittivity: 78.0,
                conductivity: 2.0e-4,
                density: 998.2,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MediumKind::Water => "water",
            MediumKind::DistilledWater => "distilled-water",
            MediumKind::DeionizedWater => "deionized-water",
        }
    }
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for MediumKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediumKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown medium '{}'", s))
    }
}
