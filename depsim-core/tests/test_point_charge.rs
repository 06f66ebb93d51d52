//! Unit tests for the point charge field source

use depsim_core::constants::COULOMB_K;
use depsim_core::tests::test_helpers::approx_eq_rel;
use depsim_core::{Electrode, PointCharge, Vector};

#[test]
fn test_field_on_positive_charge_is_infinite() {
    let charge = PointCharge::new(1.0, Vector::ZERO);
    assert_eq!(charge.field(&Vector::ZERO), Vector::splat(f64::INFINITY));
}

#[test]
fn test_field_on_negative_charge_is_negative_infinite() {
    let charge = PointCharge::new(-1.0, Vector::ZERO);
    assert_eq!(charge.field(&Vector::ZERO), Vector::splat(f64::NEG_INFINITY));
}

#[test]
fn test_field_on_neutral_charge_is_zero() {
    let charge = PointCharge::new(0.0, Vector::ZERO);
    assert_eq!(charge.field(&Vector::ZERO), Vector::ZERO);
}

#[test]
fn test_field_follows_inverse_square() {
    let charge = PointCharge::new(2.0e-9, Vector::new(1.0, 1.0, 1.0));
    let field = charge.field(&Vector::new(1.0, 3.0, 1.0));

    let expected = COULOMB_K * 2.0e-9 / 4.0;
    assert!(approx_eq_rel(field.y(), expected, 1e-12));
    assert_eq!(field.x(), 0.0);
    assert_eq!(field.z(), 0.0);
}

#[test]
fn test_field_of_negative_charge_points_inward() {
    let charge = PointCharge::new(-1.0, Vector::ZERO);
    let field = charge.field(&Vector::new(0.0, 0.0, 2.0));
    assert!(field.z() < 0.0);
}

#[test]
fn test_gradient_at_origin_is_zero() {
    let charge = PointCharge::new(1.0, Vector::new(1.0, 0.0, 0.0));
    assert_eq!(charge.gradient_component(&Vector::ZERO), Vector::ZERO);
}

#[test]
fn test_gradient_closed_form() {
    let charge = PointCharge::new(1.0e-9, Vector::ZERO);
    let coord = Vector::new(1.0, 2.0, 2.0);
    let gradient = charge.gradient_component(&coord);

    // |coord|² = 9
    let scale = -4.0 * COULOMB_K * COULOMB_K * 1.0e-18 / 729.0 * 0.7;
    assert!(approx_eq_rel(gradient.x(), scale, 1e-12));
    assert!(approx_eq_rel(gradient.y(), 2.0 * scale, 1e-12));
    assert!(approx_eq_rel(gradient.z(), 2.0 * scale, 1e-12));
}

#[test]
fn test_gradient_ignores_charge_sign() {
    let coord = Vector::new(0.5, 0.5, 0.5);
    let positive = PointCharge::new(1.0e-9, Vector::ZERO).gradient_component(&coord);
    let negative = PointCharge::new(-1.0e-9, Vector::ZERO).gradient_component(&coord);
    assert_eq!(positive, negative);
}

#[test]
fn test_voltage_sets_charge() {
    let mut electrode = Electrode::PointCharge(PointCharge::default());
    electrode.set_voltage(10.0).unwrap();
    let Electrode::PointCharge(charge) = electrode else {
        panic!("variant changed");
    };
    assert!(charge.charge() > 0.0);
}
