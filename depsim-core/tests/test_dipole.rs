//! Unit tests for the dipole field source

use depsim_core::electrode::DEFAULT_CHARGE;
use depsim_core::{DepError, Dipole, PointCharge, Vector};

#[test]
fn test_default_dipole() {
    let dipole = Dipole::default();
    assert_eq!(dipole.charge(), DEFAULT_CHARGE);
    assert_eq!(dipole.positive().charge(), DEFAULT_CHARGE);
    assert_eq!(dipole.negative().charge(), -DEFAULT_CHARGE);
    assert_eq!(dipole.positive_position(), Vector::ZERO);
    assert_eq!(dipole.negative_position(), Vector::new(1.0, 0.0, 0.0));
    assert_eq!(dipole.distance(), 1.0);
}

#[test]
fn test_from_equal_and_opposite_charges() {
    let pos = PointCharge::new(1.0, Vector::splat(1.0));
    let neg = PointCharge::new(-1.0, Vector::splat(2.0));
    let dipole = Dipole::from_charges(pos, neg).unwrap();
    assert_eq!(dipole.charge(), 1.0);
    assert_eq!(dipole.negative().charge(), -1.0);
    assert_eq!(dipole.positive_position(), Vector::splat(1.0));
    assert_eq!(dipole.negative_position(), Vector::splat(2.0));
}

#[test]
fn test_rejects_same_sign_charges() {
    let result = Dipole::from_charges(PointCharge::new(1.0, Vector::ZERO), PointCharge::new(1.0, Vector::ZERO));
    assert!(matches!(result, Err(DepError::InvalidConfiguration { .. })));
}

#[test]
fn test_field_between_poles() {
    let dipole = Dipole::new(1.0, Vector::ZERO, Vector::new(1.0, 0.0, 0.0));
    let midpoint = Vector::new(0.5, 0.0, 0.0);

    let field = dipole.field(&midpoint);
    assert!(field.x() > 0.0);
    assert_eq!(field.y(), 0.0);
    assert_eq!(field.z(), 0.0);

    assert_eq!(dipole.positive().field(&midpoint), dipole.negative().field(&midpoint));
}

#[test]
fn test_field_outside_poles_points_negative_x() {
    let dipole = Dipole::default();

    let behind_positive = dipole.field(&Vector::new(-1.0, 0.0, 0.0));
    assert!(behind_positive.x() < 0.0);
    assert_eq!(behind_positive.y(), 0.0);

    let beyond_negative = dipole.field(&Vector::new(2.0, 0.0, 0.0));
    assert!(beyond_negative.x() < 0.0);
    assert_eq!(beyond_negative.z(), 0.0);
}

#[test]
fn test_field_off_axis() {
    let field = Dipole::default().field(&Vector::new(0.25, 0.04, 1.0));
    assert!(field.x() > 0.0);
    assert!(field.y() > 0.0);
    assert!(field.z() > 0.0);
}

#[test]
fn test_moving_a_pole_updates_distance() {
    let mut dipole = Dipole::default();
    dipole.set_negative_position(Vector::new(3.0, 4.0, 0.0));
    assert_eq!(dipole.distance(), 5.0);
    dipole.set_positive_position(Vector::new(3.0, 4.0, 2.0));
    assert_eq!(dipole.distance(), 2.0);
}

#[test]
fn test_gradient_is_sum_of_poles() {
    let dipole = Dipole::new(1.0e-9, Vector::new(1.0, 0.0, 0.0), Vector::new(-1.0, 0.0, 0.0));
    let coord = Vector::new(0.3, 0.2, 0.1);
    let expected = dipole.positive().gradient_component(&coord) + dipole.negative().gradient_component(&coord);
    assert_eq!(dipole.gradient_component(&coord), expected);
}

#[test]
fn test_voltage_keeps_poles_opposite() {
    let mut dipole = Dipole::default();
    dipole.set_voltage(-3.0);
    assert!(dipole.charge() < 0.0);
    assert_eq!(dipole.positive().charge(), -dipole.negative().charge());
}
