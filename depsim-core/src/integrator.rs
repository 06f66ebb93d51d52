use crate::bounds::Bounds;
use crate::constants::VACUUM_PERMITTIVITY;
use crate::electrode::Electrode;
use crate::error::{DepError, Result};
use crate::particle::Particle;
use crate::vector::Vector;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Dielectrophoretic force on `particle`:
/// `2π r³ ε₀ εp Re[fCM] · ∇|E|²`
pub fn dep_force(particle: &Particle, electrode: &Electrode) -> Vector {
    let coefficient = 2.0
        * PI
        * particle.radius().powi(3)
        * VACUUM_PERMITTIVITY
        * particle.permittivity()
        * particle.fcm_real();

    electrode.gradient_component(&particle.position()) * coefficient
}

/// Sum of every force acting on `particle`.
///
/// Drag is zero and buoyancy exactly cancels gravity, leaving the DEP
/// force as the only contribution that moves anything.
pub fn total_force(particle: &Particle, electrode: &Electrode) -> Vector {
    let gravity = particle.gravity();
    let buoyancy = -gravity;
    let drag = Vector::ZERO;

    dep_force(particle, electrode) + drag + buoyancy + gravity
}

/// Step every particle forward by `dt` and pull it back inside `bounds`.
///
/// Forces are computed for all particles first, in parallel, from the
/// positions at the start of the step. Moved particles are staged and only
/// written back once every one of them has a finite position, so a failed
/// step leaves `particles` untouched.
pub fn step(
    particles: &mut [Particle],
    electrode: &Electrode,
    bounds: &Bounds,
    dt: f64,
) -> Result<()> {
    let forces: Vec<Vector> = particles
        .par_iter()
        .map(|particle| total_force(particle, electrode))
        .collect();

    let moved = particles
        .iter()
        .zip(forces)
        .enumerate()
        .map(|(index, (particle, force))| {
            let mut next = particle.clone();
            next.advance(force, dt);

            let clamped = bounds.clamp(next.position(), next.radius());
            if !clamped.is_finite() {
                return Err(DepError::NonFinitePosition { index });
            }
            next.set_position(clamped);
            Ok(next)
        })
        .collect::<Result<Vec<Particle>>>()?;

    particles.clone_from_slice(&moved);
    Ok(())
}
