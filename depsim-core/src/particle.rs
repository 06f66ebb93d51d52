//! Suspended particles and their polarization response.

use crate::constants::{GRAVITY, VACUUM_PERMITTIVITY};
use crate::error::{DepError, Result};
use crate::medium::Medium;
use crate::vector::Vector;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// A polarizable particle suspended in the medium
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    kind: ParticleKind,
    position: Vector,
    velocity: f64,
    mass: f64,
    radius: f64,
    permittivity: f64,
    conductivity: f64,
    fcm_real: f64,
    fcm_imag: f64,
}

impl Particle {
    /// Create a particle of `kind` at `position`, sampling mass and radius
    /// with the thread-local generator.
    pub fn new(kind: ParticleKind, position: Vector) -> Self {
        Self::with_rng(kind, position, &mut rand::rng())
    }

    /// Create a particle drawing its size from `rng`.
    ///
    /// A single standard normal sample scales both tolerances, so mass and
    /// radius deviate from the species mean together. The sample is not
    /// clamped.
    pub fn with_rng<R: Rng + ?Sized>(kind: ParticleKind, position: Vector, rng: &mut R) -> Self {
        let species = kind.constants();
        let sample: f64 = StandardNormal.sample(rng);

        Self::with_properties(
            kind,
            position,
            species.mass + species.mass_tolerance * sample,
            species.radius + species.radius_tolerance * sample,
        )
    }

    /// Create a particle with an exact mass and radius
    pub fn with_properties(kind: ParticleKind, position: Vector, mass: f64, radius: f64) -> Self {
        let species = kind.constants();
        Self {
            kind,
            position,
            velocity: 0.0,
            mass,
            radius,
            permittivity: species.permittivity,
            conductivity: species.conductivity,
            fcm_real: 0.0,
            fcm_imag: 0.0,
        }
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    /// Displacement per unit time over the last step
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Mass in kg
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Radius in m
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn permittivity(&self) -> f64 {
        self.permittivity
    }

    pub fn conductivity(&self) -> f64 {
        self.conductivity
    }

    pub fn fcm_real(&self) -> f64 {
        self.fcm_real
    }

    pub fn fcm_imag(&self) -> f64 {
        self.fcm_imag
    }

    /// Weight of the particle, pointing down the y axis
    pub fn gravity(&self) -> Vector {
        Vector::new(0.0, -GRAVITY * self.mass, 0.0)
    }

    /// Recompute the Clausius–Mossotti factor for `medium` driven at `frequency` Hz
    pub fn calc_fcm(&mut self, medium: &Medium, frequency: f64) -> Result<()> {
        let (real, imag) = clausius_mossotti(
            self.permittivity,
            self.conductivity,
            medium,
            frequency,
        )?;
        self.fcm_real = real;
        self.fcm_imag = imag;
        Ok(())
    }

    pub(crate) fn set_fcm(&mut self, (real, imag): (f64, f64)) {
        self.fcm_real = real;
        self.fcm_imag = imag;
    }

    /// Move the particle under `force` for `dt` seconds.
    ///
    /// Each axis advances by `1.5 * dt² * F / m`. Velocity becomes the
    /// length of that displacement divided by `dt`.
    pub fn advance(&mut self, force: Vector, dt: f64) {
        let previous = self.position;
        self.position += force * (1.5 * dt * dt) / self.mass;
        self.velocity = self.position.distance(&previous) / dt;
    }
}

/// Real and imaginary parts of the Clausius–Mossotti factor of a particle
/// with relative permittivity `permittivity` and conductivity
/// `conductivity` suspended in `medium` at `frequency` Hz.
pub fn clausius_mossotti(
    permittivity: f64,
    conductivity: f64,
    medium: &Medium,
    frequency: f64,
) -> Result<(f64, f64)> {
    check_frequency(frequency)?;

    let omega = 2.0 * PI * frequency;
    let omega_sq = omega * omega;

    let permd = (permittivity - medium.permittivity()) * VACUUM_PERMITTIVITY;
    let perms = (permittivity + 2.0 * medium.permittivity()) * VACUUM_PERMITTIVITY;
    let condd = conductivity - medium.conductivity();
    let conds = conductivity + 2.0 * medium.conductivity();

    let denom = omega_sq * perms * perms + conds * conds;

    let real = (omega_sq * permd * perms + condd * conds) / denom;
    let imag = (omega * condd * perms - permd * conds) / denom;

    Ok((real, imag))
}

pub(crate) fn check_frequency(frequency: f64) -> Result<()> {
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(DepError::invalid_argument(format!(
            "frequency must be a non-negative number of Hz, got {}",
            frequency
        )));
    }
    Ok(())
}

/// Constants of one particle species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesConstants {
    /// Mean mass, kg
    pub mass: f64,
    pub mass_tolerance: f64,
    /// Mean radius, m
    pub radius: f64,
    pub radius_tolerance: f64,
    pub permittivity: f64,
    /// S/m
    pub conductivity: f64,
}

/// Particle species with tabulated constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleKind {
    /// A typical budding yeast cell
    Yeast,
    /// 1 µm diameter polystyrene bead
    #[serde(rename = "polystyrene-1um")]
    Polystyrene1um,
    /// 1 kg, 1 m sphere with no size spread
    TestParticle,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [
        ParticleKind::Yeast,
        ParticleKind::Polystyrene1um,
        ParticleKind::TestParticle,
    ];

    pub fn constants(self) -> SpeciesConstants {
        match self {
            ParticleKind::Yeast => SpeciesConstants {
                mass: 6.0e-14,
                mass_tolerance: 5.0e-15,
                radius: 5.0e-6,
                radius_tolerance: 5.0e-7,
                permittivity: 60.0,
                conductivity: 0.01,
            },
            // Effective conductivity is dominated by surface conductance, 2·Ks/r
            ParticleKind::Polystyrene1um => SpeciesConstants {
                mass: 5.5e-16,
                mass_tolerance: 5.0e-17,
                radius: 5.0e-7,
                radius_tolerance: 5.0e-8,
                permittivity: 2.55,
                conductivity: 4.0e-3,
            },
            ParticleKind::TestParticle => SpeciesConstants {
                mass: 1.0,
                mass_tolerance: 0.0,
                radius: 1.0,
                radius_tolerance: 0.0,
                permittivity: 1.0,
                conductivity: 1.0,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Yeast => "yeast",
            ParticleKind::Polystyrene1um => "polystyrene-1um",
            ParticleKind::TestParticle => "test-particle",
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ParticleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ParticleKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown particle '{}'", s))
    }
}
