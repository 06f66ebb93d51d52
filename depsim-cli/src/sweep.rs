//! Clausius–Mossotti factor across frequency decades.

use depsim_core::particle::clausius_mossotti;
use depsim_core::{DepError, Medium, MediumKind, ParticleKind};

/// fCM of one species in one medium at a single frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FcmSample {
    pub frequency: f64,
    pub real: f64,
    pub imag: f64,
}

/// fCM at `10^first`, `10^(first + 1)`, ... for `decades` frequencies
pub fn fcm_sweep(
    particle: ParticleKind,
    medium: MediumKind,
    first: i32,
    decades: u32,
) -> Result<Vec<FcmSample>, DepError> {
    let species = particle.constants();
    let medium = Medium::from_kind(medium);

    (0..decades as i32)
        .map(|step| {
            let frequency = 10f64.powi(first + step);
            let (real, imag) =
                clausius_mossotti(species.permittivity, species.conductivity, &medium, frequency)?;
            Ok(FcmSample {
                frequency,
                real,
                imag,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_covers_each_decade() {
        let samples =
            fcm_sweep(ParticleKind::Polystyrene1um, MediumKind::DeionizedWater, -8, 10).unwrap();

        assert_eq!(samples.len(), 10);
        assert!((samples[0].frequency - 1.0e-8).abs() < 1.0e-20);
        assert_eq!(samples[9].frequency, 10.0);
    }

    #[test]
    fn sweep_matches_single_particle_factor() {
        let samples = fcm_sweep(ParticleKind::Yeast, MediumKind::Water, 3, 1).unwrap();

        let mut particle = depsim_core::Particle::new(ParticleKind::Yeast, depsim_core::Vector::ZERO);
        particle
            .calc_fcm(&Medium::from_kind(MediumKind::Water), 1000.0)
            .unwrap();

        assert_eq!(samples[0].real, particle.fcm_real());
        assert_eq!(samples[0].imag, particle.fcm_imag());
    }

    #[test]
    fn high_frequency_follows_permittivity() {
        // Polystyrene is far less polarisable than water once conduction stops mattering
        let samples =
            fcm_sweep(ParticleKind::Polystyrene1um, MediumKind::DeionizedWater, 9, 1).unwrap();
        assert!(samples[0].real < 0.0);
    }

    #[test]
    fn empty_sweep() {
        assert!(fcm_sweep(ParticleKind::Yeast, MediumKind::Water, 0, 0)
            .unwrap()
            .is_empty());
    }
}
