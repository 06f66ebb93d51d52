//! Electric field sources.
//!
//! Every electrode reduces to a set of point charges. The field and the
//! squared field gradient of a composite electrode are the vector sums of
//! the contributions of its charges.

use crate::constants::{COULOMB_K, MIN_ELECTRODE_RADIUS, RMS_GRADIENT_FACTOR};
use crate::error::{DepError, Result};
use crate::vector::Vector;
use std::fmt;
use std::str::FromStr;

/// Charge magnitude used by the default dipole and quadrupole, C
pub const DEFAULT_CHARGE: f64 = 1.0e-6;

/// Charge that holds a sphere of [`MIN_ELECTRODE_RADIUS`] at `voltage` relative to infinity.
///
/// This is an empirical stand-in for the electrode geometry: each
/// conductor is treated as an isolated sphere of the minimum radius.
fn charge_for_potential(voltage: f64) -> f64 {
    voltage * MIN_ELECTRODE_RADIUS / COULOMB_K
}

/// The active field source of a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum Electrode {
    PointCharge(PointCharge),
    Dipole(Dipole),
    Quadrupole(Quadrupole),
}

impl Electrode {
    /// Electric field at `coord`
    pub fn field(&self, coord: &Vector) -> Vector {
        match self {
            Electrode::PointCharge(charge) => charge.field(coord),
            Electrode::Dipole(dipole) => dipole.field(coord),
            Electrode::Quadrupole(quad) => quad.field(coord),
        }
    }

    /// Gradient of the rms squared field at `coord`
    pub fn gradient_component(&self, coord: &Vector) -> Vector {
        match self {
            Electrode::PointCharge(charge) => charge.gradient_component(coord),
            Electrode::Dipole(dipole) => dipole.gradient_component(coord),
            Electrode::Quadrupole(quad) => quad.gradient_component(coord),
        }
    }

    /// Rescale the charges to the given drive voltage
    pub fn set_voltage(&mut self, voltage: f64) -> Result<()> {
        match self {
            Electrode::PointCharge(charge) => {
                charge.set_voltage(voltage);
                Ok(())
            }
            Electrode::Dipole(dipole) => {
                dipole.set_voltage(voltage);
                Ok(())
            }
            Electrode::Quadrupole(quad) => quad.set_voltage(voltage),
        }
    }

    pub fn kind(&self) -> ElectrodeKind {
        match self {
            Electrode::PointCharge(_) => ElectrodeKind::PointCharge,
            Electrode::Dipole(_) => ElectrodeKind::Dipole,
            Electrode::Quadrupole(_) => ElectrodeKind::Quadrupole,
        }
    }

    /// The point charges making up this electrode
    pub fn point_charges(&self) -> Vec<PointCharge> {
        match self {
            Electrode::PointCharge(charge) => vec![*charge],
            Electrode::Dipole(dipole) => vec![dipole.positive, dipole.negative],
            Electrode::Quadrupole(quad) => quad.point_charges().to_vec(),
        }
    }
}

impl From<PointCharge> for Electrode {
    fn from(value: PointCharge) -> Self {
        Electrode::PointCharge(value)
    }
}

impl From<Dipole> for Electrode {
    fn from(value: Dipole) -> Self {
        Electrode::Dipole(value)
    }
}

impl From<Quadrupole> for Electrode {
    fn from(value: Quadrupole) -> Self {
        Electrode::Quadrupole(value)
    }
}

/// Electrode variants, for selecting a configuration by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElectrodeKind {
    PointCharge,
    Dipole,
    Quadrupole,
}

impl ElectrodeKind {
    pub const ALL: [ElectrodeKind; 3] = [
        ElectrodeKind::PointCharge,
        ElectrodeKind::Dipole,
        ElectrodeKind::Quadrupole,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElectrodeKind::PointCharge => "point-charge",
            ElectrodeKind::Dipole => "dipole",
            ElectrodeKind::Quadrupole => "quadrupole",
        }
    }
}

impl fmt::Display for ElectrodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ElectrodeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ElectrodeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown electrode '{}'", s))
    }
}

/// A single charge in C at a fixed position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointCharge {
    charge: f64,
    position: Vector,
}

impl PointCharge {
    pub fn new(charge: f64, position: Vector) -> Self {
        Self { charge, position }
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn set_charge(&mut self, charge: f64) {
        self.charge = charge;
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    pub fn set_voltage(&mut self, voltage: f64) {
        self.charge = charge_for_potential(voltage);
    }

    /// Coulomb field at `coord`.
    ///
    /// On the charge itself every component is +∞ or −∞ following the sign
    /// of the charge, or zero for an uncharged point.
    pub fn field(&self, coord: &Vector) -> Vector {
        let Ok(direction) = (*coord - self.position).unit() else {
            return self.singular_field();
        };

        let radius = self.position.distance(coord);
        let magnitude = COULOMB_K * self.charge / (radius * radius);

        direction * magnitude
    }

    fn singular_field(&self) -> Vector {
        if self.charge > 0.0 {
            Vector::splat(f64::INFINITY)
        } else if self.charge < 0.0 {
            Vector::splat(f64::NEG_INFINITY)
        } else {
            Vector::ZERO
        }
    }

    /// `((-4 k² Q²) / |coord|⁶) · 0.7` applied to the offset from the charge.
    ///
    /// The denominator is measured from the origin, not from the charge.
    pub fn gradient_component(&self, coord: &Vector) -> Vector {
        if *coord == Vector::ZERO {
            return Vector::ZERO;
        }

        let sum_sq = coord.x() * coord.x() + coord.y() * coord.y() + coord.z() * coord.z();
        let scale = (-4.0 * COULOMB_K * COULOMB_K * self.charge * self.charge)
            / (sum_sq * sum_sq * sum_sq)
            * RMS_GRADIENT_FACTOR;

        (*coord - self.position) * scale
    }
}

/// Two equal and opposite charges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dipole {
    positive: PointCharge,
    negative: PointCharge,
    distance: f64,
}

impl Default for Dipole {
    /// 1 µC at the origin and (1, 0, 0)
    fn default() -> Self {
        Self::new(DEFAULT_CHARGE, Vector::ZERO, Vector::new(1.0, 0.0, 0.0))
    }
}

impl Dipole {
    /// `+charge` at `positive`, `-charge` at `negative`
    pub fn new(charge: f64, positive: Vector, negative: Vector) -> Self {
        Self {
            positive: PointCharge::new(charge, positive),
            negative: PointCharge::new(-charge, negative),
            distance: positive.distance(&negative),
        }
    }

    /// Build from two existing charges, which must be equal and opposite
    pub fn from_charges(positive: PointCharge, negative: PointCharge) -> Result<Self> {
        if positive.charge() != -negative.charge() {
            return Err(DepError::invalid_configuration(format!(
                "dipole charges {} and {} are not equal and opposite",
                positive.charge(),
                negative.charge()
            )));
        }

        Ok(Self {
            positive,
            negative,
            distance: positive.position().distance(&negative.position()),
        })
    }

    pub fn field(&self, coord: &Vector) -> Vector {
        self.positive.field(coord) + self.negative.field(coord)
    }

    pub fn gradient_component(&self, coord: &Vector) -> Vector {
        self.positive.gradient_component(coord) + self.negative.gradient_component(coord)
    }

    /// Magnitude of the charge on each pole
    pub fn charge(&self) -> f64 {
        self.positive.charge()
    }

    pub fn set_charge(&mut self, charge: f64) {
        self.positive.set_charge(charge);
        self.negative.set_charge(-charge);
    }

    /// Drive the poles at ±voltage/2, each treated as an isolated sphere
    /// of [`MIN_ELECTRODE_RADIUS`].
    pub fn set_voltage(&mut self, voltage: f64) {
        self.set_charge(charge_for_potential(voltage / 2.0));
    }

    /// Separation between the poles
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn positive(&self) -> PointCharge {
        self.positive
    }

    pub fn negative(&self) -> PointCharge {
        self.negative
    }

    pub fn positive_position(&self) -> Vector {
        self.positive.position()
    }

    pub fn negative_position(&self) -> Vector {
        self.negative.position()
    }

    pub fn set_positive_position(&mut self, position: Vector) {
        self.positive.set_position(position);
        self.update_distance();
    }

    pub fn set_negative_position(&mut self, position: Vector) {
        self.negative.set_position(position);
        self.update_distance();
    }

    fn update_distance(&mut self) {
        self.distance = self.positive.position().distance(&self.negative.position());
    }
}

/// Two positive and two negative charges of equal magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrupole {
    positive1: PointCharge,
    positive2: PointCharge,
    negative1: PointCharge,
    negative2: PointCharge,
}

impl Default for Quadrupole {
    /// 1 µC charges on the corners of the unit square in the xy plane,
    /// positives on one diagonal and negatives on the other
    fn default() -> Self {
        Self {
            positive1: PointCharge::new(DEFAULT_CHARGE, Vector::new(0.0, 0.0, 0.0)),
            positive2: PointCharge::new(DEFAULT_CHARGE, Vector::new(1.0, 1.0, 0.0)),
            negative1: PointCharge::new(-DEFAULT_CHARGE, Vector::new(1.0, 0.0, 0.0)),
            negative2: PointCharge::new(-DEFAULT_CHARGE, Vector::new(0.0, 1.0, 0.0)),
        }
    }
}

impl Quadrupole {
    /// Build from four charges.
    ///
    /// Both positives must carry the same non-negative charge and both
    /// negatives its exact opposite.
    pub fn new(
        positive1: PointCharge,
        positive2: PointCharge,
        negative1: PointCharge,
        negative2: PointCharge,
    ) -> Result<Self> {
        let valid = positive1.charge() == positive2.charge()
            && negative1.charge() == negative2.charge()
            && positive1.charge() == -negative1.charge()
            && positive2.charge() == -negative2.charge()
            && positive1.charge() >= 0.0;

        if !valid {
            return Err(DepError::invalid_configuration(format!(
                "quadrupole charges [{}, {}, {}, {}] have unequal magnitudes or bad signs",
                positive1.charge(),
                positive2.charge(),
                negative1.charge(),
                negative2.charge()
            )));
        }

        Ok(Self {
            positive1,
            positive2,
            negative1,
            negative2,
        })
    }

    /// Combine two dipoles carrying the same charge
    pub fn from_dipoles(one: &Dipole, two: &Dipole) -> Result<Self> {
        if one.charge() != two.charge() {
            return Err(DepError::invalid_configuration(format!(
                "dipole charges {} and {} differ",
                one.charge(),
                two.charge()
            )));
        }

        Self::new(one.positive(), two.positive(), one.negative(), two.negative())
    }

    pub fn field(&self, coord: &Vector) -> Vector {
        self.point_charges()
            .iter()
            .fold(Vector::ZERO, |sum, charge| sum + charge.field(coord))
    }

    pub fn gradient_component(&self, coord: &Vector) -> Vector {
        self.point_charges()
            .iter()
            .fold(Vector::ZERO, |sum, charge| sum + charge.gradient_component(coord))
    }

    /// No voltage-to-charge mapping exists for this geometry yet; the
    /// charges are left untouched.
    pub fn set_voltage(&self, _voltage: f64) -> Result<()> {
        Err(DepError::Unsupported {
            operation: "setting a quadrupole's voltage",
        })
    }

    /// Magnitude of the charge on each pole
    pub fn charge(&self) -> f64 {
        self.positive1.charge()
    }

    /// Charges in the order positive1, positive2, negative1, negative2
    pub fn point_charges(&self) -> [PointCharge; 4] {
        [self.positive1, self.positive2, self.negative1, self.negative2]
    }

    /// Positions in the order positive1, positive2, negative1, negative2
    pub fn positions(&self) -> [Vector; 4] {
        self.point_charges().map(|charge| charge.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_maps_linearly_to_charge() {
        let mut dipole = Dipole::default();
        dipole.set_voltage(10.0);
        let expected = 5.0 * MIN_ELECTRODE_RADIUS / COULOMB_K;
        assert_eq!(dipole.charge(), expected);
        assert_eq!(dipole.negative().charge(), -expected);
    }

    #[test]
    fn quadrupole_voltage_is_unsupported() {
        let mut electrode = Electrode::Quadrupole(Quadrupole::default());
        let before = electrode.clone();
        assert!(matches!(
            electrode.set_voltage(5.0),
            Err(DepError::Unsupported { .. })
        ));
        assert_eq!(electrode, before);
    }

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in ElectrodeKind::ALL {
            assert_eq!(kind.name().parse::<ElectrodeKind>(), Ok(kind));
        }
    }
}
