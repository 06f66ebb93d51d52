//! Scenario files and name-based construction of core types.
//!
//! A scenario is a YAML document describing the container, medium,
//! electrode and particle population of a run. Every field is optional:
//!
//! ```yaml
//! bounds:
//!   low: [0.0, 0.0, 0.0]
//!   high: [150.0e-6, 150.0e-6, 150.0e-6]
//! medium:
//!   kind: deionized-water
//!   level: 75.0e-6          # defaults to half the container height
//! frequency: 1000.0         # Hz
//! electrode:
//!   kind: dipole            # point-charge | dipole | quadrupole
//!   charge: 0.0
//!   positive: [30.0e-6, 0.0, 75.0e-6]
//!   negative: [120.0e-6, 0.0, 75.0e-6]
//! voltage: 10.0             # applied after the electrode is built
//! time_step: 0.05           # simulated seconds per step at 1x
//! tick_interval_ms: 50
//! seed: 42                  # makes particle sizes reproducible
//! particles:
//!   - kind: yeast
//!     count: 3
//!   - kind: polystyrene-1um
//! ```

use depsim_core::config::{DEFAULT_BOUND, DEFAULT_FREQUENCY, DEFAULT_TICK_INTERVAL, DEFAULT_TIME_STEP};
use depsim_core::{
    Bounds, DepError, Dipole, Electrode, ElectrodeKind, EngineConfig, Medium, MediumKind,
    Particle, ParticleKind, PointCharge, Quadrupole, SimulationEngine, Vector,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

/// Container corners
#[derive(Deserialize, Debug, Clone)]
pub struct BoundsConfig {
    pub low: Vector,
    pub high: Vector,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            low: Vector::ZERO,
            high: Vector::splat(DEFAULT_BOUND),
        }
    }
}

/// Suspending fluid, picked by name
#[derive(Deserialize, Debug, Clone)]
pub struct MediumConfig {
    pub kind: MediumKind,
    pub level: Option<f64>, // fill height; half the container when absent
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            kind: MediumKind::DeionizedWater,
            level: None,
        }
    }
}

/// Electrode geometry and charge.
/// The charge is the magnitude on every pole; negative poles carry its opposite.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ElectrodeSpec {
    PointCharge {
        #[serde(default)]
        charge: f64,
        position: Vector,
    },
    Dipole {
        #[serde(default)]
        charge: f64,
        positive: Vector,
        negative: Vector,
    },
    Quadrupole {
        #[serde(default)]
        charge: f64,
        positive1: Vector,
        positive2: Vector,
        negative1: Vector,
        negative2: Vector,
    },
}

impl ElectrodeSpec {
    pub fn build(&self) -> Result<Electrode, DepError> {
        let electrode = match *self {
            ElectrodeSpec::PointCharge { charge, position } => {
                Electrode::PointCharge(PointCharge::new(charge, position))
            }
            ElectrodeSpec::Dipole {
                charge,
                positive,
                negative,
            } => Electrode::Dipole(Dipole::new(charge, positive, negative)),
            ElectrodeSpec::Quadrupole {
                charge,
                positive1,
                positive2,
                negative1,
                negative2,
            } => Electrode::Quadrupole(Quadrupole::new(
                PointCharge::new(charge, positive1),
                PointCharge::new(charge, positive2),
                PointCharge::new(-charge, negative1),
                PointCharge::new(-charge, negative2),
            )?),
        };
        Ok(electrode)
    }
}

/// A number of particles of one species
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ParticleGroup {
    pub kind: ParticleKind,
    #[serde(default = "one")]
    pub count: usize,
}

fn one() -> usize {
    1
}

/// Top-level scenario loaded from YAML
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScenarioConfig {
    pub bounds: BoundsConfig,
    pub medium: MediumConfig,
    pub frequency: f64,
    pub electrode: Option<ElectrodeSpec>, // placed by `default_electrode` when absent
    pub voltage: Option<f64>,
    pub time_step: f64,
    pub tick_interval_ms: u64,
    pub seed: Option<u64>,
    pub particles: Vec<ParticleGroup>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            bounds: BoundsConfig::default(),
            medium: MediumConfig::default(),
            frequency: DEFAULT_FREQUENCY,
            electrode: None,
            voltage: None,
            time_step: DEFAULT_TIME_STEP,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            seed: None,
            particles: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_yaml(&text)?;
        info!("loaded scenario {}", path.display());
        Ok(scenario)
    }

    /// Load `path` if given, otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, DepError> {
        let bounds = Bounds::new(self.bounds.low, self.bounds.high)?;
        let level = self
            .medium
            .level
            .unwrap_or_else(|| bounds.low().y() + (bounds.high().y() - bounds.low().y()) / 2.0);
        let electrode = match &self.electrode {
            Some(spec) => spec.build()?,
            None => default_electrode(ElectrodeKind::Dipole, &bounds)?,
        };

        Ok(EngineConfig {
            bounds,
            medium: Medium::from_kind(self.medium.kind).with_level(level),
            frequency: self.frequency,
            electrode,
            base_time_step: self.time_step,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        })
    }

    /// Random source for particle sizes: seeded when the scenario asks for it
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Build an engine and populate it with the scenario's particles
    pub fn build_engine(&self, extra: &[ParticleKind]) -> Result<SimulationEngine, DepError> {
        let engine = SimulationEngine::new(self.engine_config()?)?;

        if let Some(voltage) = self.voltage {
            if let Err(error) = engine.set_voltage(voltage) {
                warn!("scenario voltage not applied: {}", error);
            }
        }

        let mut rng = self.rng();
        let kinds = self
            .particles
            .iter()
            .flat_map(|group| std::iter::repeat(group.kind).take(group.count))
            .chain(extra.iter().copied());
        for kind in kinds {
            engine.add_particle(spawn(kind, &mut rng))?;
        }

        info!("engine ready with {} particles", engine.particle_count());
        Ok(engine)
    }
}

/// Uncharged electrode of `kind`, placed on the floor of `bounds`.
///
/// A point charge sits at the floor center. Dipole poles lie along x at one
/// and four fifths of the width. Quadrupole corners form a square of half
/// the width around the floor center, positives on one diagonal.
pub fn default_electrode(kind: ElectrodeKind, bounds: &Bounds) -> Result<Electrode, DepError> {
    let low = bounds.low();
    let size = bounds.high() - low;
    let center = bounds.center();
    let floor = |x: f64, z: f64| Vector::new(x, low.y(), z);

    let spec = match kind {
        ElectrodeKind::PointCharge => ElectrodeSpec::PointCharge {
            charge: 0.0,
            position: floor(center.x(), center.z()),
        },
        ElectrodeKind::Dipole => ElectrodeSpec::Dipole {
            charge: 0.0,
            positive: floor(low.x() + size.x() / 5.0, center.z()),
            negative: floor(low.x() + size.x() * 4.0 / 5.0, center.z()),
        },
        ElectrodeKind::Quadrupole => {
            let half = size.x() / 4.0;
            ElectrodeSpec::Quadrupole {
                charge: 0.0,
                positive1: floor(center.x() - half, center.z() - half),
                positive2: floor(center.x() + half, center.z() + half),
                negative1: floor(center.x() + half, center.z() - half),
                negative2: floor(center.x() - half, center.z() + half),
            }
        }
    };
    spec.build()
}

/// A particle of `kind` with its size drawn from `rng`
pub fn spawn<R: Rng + ?Sized>(kind: ParticleKind, rng: &mut R) -> Particle {
    Particle::with_rng(kind, Vector::ZERO, rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let scenario = ScenarioConfig::from_yaml("{}").unwrap();
        let config = scenario.engine_config().unwrap();
        let defaults = EngineConfig::default();

        assert_eq!(config.bounds, defaults.bounds);
        assert_eq!(config.medium, defaults.medium);
        assert_eq!(config.frequency, defaults.frequency);
        assert_eq!(config.electrode, defaults.electrode);
        assert_eq!(config.base_time_step, defaults.base_time_step);
        assert_eq!(config.tick_interval, defaults.tick_interval);
    }

    #[test]
    fn parses_full_scenario() {
        let yaml = r#"
bounds:
  low: [0.0, 0.0, 0.0]
  high: [1.0e-4, 2.0e-4, 1.0e-4]
medium:
  kind: water
  level: 5.0e-5
frequency: 5000.0
electrode:
  kind: point-charge
  charge: 1.0e-12
  position: [5.0e-5, 0.0, 5.0e-5]
time_step: 0.01
tick_interval_ms: 5
seed: 7
particles:
  - kind: yeast
    count: 2
  - kind: polystyrene-1um
"#;
        let scenario = ScenarioConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            scenario.particles,
            vec![
                ParticleGroup { kind: ParticleKind::Yeast, count: 2 },
                ParticleGroup { kind: ParticleKind::Polystyrene1um, count: 1 },
            ]
        );

        let config = scenario.engine_config().unwrap();
        assert_eq!(config.medium, Medium::from_kind(MediumKind::Water).with_level(5.0e-5));
        assert_eq!(config.frequency, 5000.0);
        assert_eq!(
            config.electrode,
            Electrode::PointCharge(PointCharge::new(1.0e-12, Vector::new(5.0e-5, 0.0, 5.0e-5)))
        );
        assert_eq!(config.tick_interval, Duration::from_millis(5));
    }

    #[test]
    fn unknown_tag_is_a_parse_error() {
        assert!(ScenarioConfig::from_yaml("medium:\n  kind: seawater\n").is_err());
        assert!(ScenarioConfig::from_yaml("electrode:\n  kind: hexapole\n").is_err());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let yaml = "bounds:\n  low: [1.0, 1.0, 1.0]\n  high: [0.0, 0.0, 0.0]\n";
        let scenario = ScenarioConfig::from_yaml(yaml).unwrap();
        assert!(matches!(
            scenario.engine_config(),
            Err(DepError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn seeded_scenarios_are_reproducible() {
        let yaml = "seed: 42\ntick_interval_ms: 1\nparticles:\n  - kind: yeast\n    count: 3\n";
        let scenario = ScenarioConfig::from_yaml(yaml).unwrap();

        let first = scenario.build_engine(&[]).unwrap().particles();
        let second = scenario.build_engine(&[ParticleKind::TestParticle]).unwrap().particles();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 4);
        assert_eq!(first[..], second[..3]);
    }

    #[test]
    fn default_electrodes_sit_inside_bounds() {
        let bounds = EngineConfig::default().bounds;
        for kind in ElectrodeKind::ALL {
            let electrode = default_electrode(kind, &bounds).unwrap();
            assert_eq!(electrode.kind(), kind);
            for charge in electrode.point_charges() {
                assert_eq!(charge.charge(), 0.0);
                assert_eq!(bounds.clamp(charge.position(), 0.0), charge.position());
            }
        }
    }

    #[test]
    fn default_dipole_matches_engine_default() {
        let bounds = EngineConfig::default().bounds;
        assert_eq!(
            default_electrode(ElectrodeKind::Dipole, &bounds).unwrap(),
            EngineConfig::default().electrode
        );
    }
}
