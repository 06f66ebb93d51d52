//! Physical constants in SI units.

/// Coulomb's constant k = 1/(4πε₀), N·m²/C²
pub const COULOMB_K: f64 = 8_987_552_000.0;

/// Permittivity of free space ε₀, F/m
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_817e-12;

/// Standard gravity, m/s²
pub const GRAVITY: f64 = 9.806_65;

/// Radius of the spherical conductor assumed when mapping an applied
/// voltage onto an electrode's point charge, m
pub const MIN_ELECTRODE_RADIUS: f64 = 5.0e-6;

/// Scale applied to the squared field gradient to get its rms value
pub const RMS_GRADIENT_FACTOR: f64 = 0.7;
