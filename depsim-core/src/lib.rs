pub mod bounds;
pub mod config;
pub mod constants;
pub mod electrode;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod medium;
pub mod particle;
pub mod vector;

pub use bounds::Bounds;
pub use config::EngineConfig;
pub use electrode::{Dipole, Electrode, ElectrodeKind, PointCharge, Quadrupole};
pub use engine::{RunState, SimulationEngine, StepperExit, SPEED_MAX, SPEED_MIN};
pub use error::{DepError, Result};
pub use medium::{Medium, MediumKind};
pub use particle::{Particle, ParticleKind};
pub use vector::Vector;
