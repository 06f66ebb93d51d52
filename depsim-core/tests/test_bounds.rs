//! Container clamp tests

use depsim_core::{Bounds, Vector};

fn container() -> Bounds {
    Bounds::new(Vector::ZERO, Vector::splat(150.0e-6)).unwrap()
}

#[test]
fn test_particle_past_high_is_pulled_back() {
    let bounds = container();
    let radius = 5.0e-6;
    let outside = Vector::new(bounds.high().x() + 10.0 * radius, 75.0e-6, 75.0e-6);

    let clamped = bounds.clamp(outside, radius);

    assert_eq!(clamped.x(), bounds.high().x() - radius);
    assert_eq!(clamped.y(), 75.0e-6);
    assert_eq!(clamped.z(), 75.0e-6);
}

#[test]
fn test_particle_below_low_is_pushed_up() {
    let bounds = container();
    let radius = 5.0e-6;
    let clamped = bounds.clamp(Vector::new(75.0e-6, -1.0, 75.0e-6), radius);
    assert_eq!(clamped.y(), radius);
}

#[test]
fn test_particle_inside_is_unaffected() {
    let bounds = container();
    let inside = Vector::new(10.0e-6, 140.0e-6, 75.0e-6);
    assert_eq!(bounds.clamp(inside, 5.0e-6), inside);
}

#[test]
fn test_particle_on_boundary_is_unaffected() {
    let bounds = container();
    assert_eq!(bounds.clamp(bounds.high(), 5.0e-6), bounds.high());
    assert_eq!(bounds.clamp(bounds.low(), 5.0e-6), bounds.low());
}

#[test]
fn test_infinite_position_is_clamped() {
    let bounds = container();
    let clamped = bounds.clamp(Vector::new(f64::INFINITY, f64::NEG_INFINITY, 0.0), 1.0e-6);
    assert_eq!(clamped, Vector::new(150.0e-6 - 1.0e-6, 1.0e-6, 0.0));
}
