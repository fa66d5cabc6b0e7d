//! Tests for color ramp construction and anchor interpolation.

use color_ramp::{ColorRamp, RampName};
use kml_common::{ConvertError, Rgb};

// ============================================================================
// Built-in ramp tests
// ============================================================================

#[test]
fn test_builtin_ramps_are_distinct() {
    let hue = ColorRamp::builtin(RampName::Hue);
    let terrain = ColorRamp::builtin(RampName::Terrain);
    let aqua = ColorRamp::builtin(RampName::Aqua);

    assert_ne!(hue.colors(), terrain.colors());
    assert_ne!(terrain.colors(), aqua.colors());
}

#[test]
fn test_builtin_aqua_endpoints() {
    let aqua = ColorRamp::builtin(RampName::Aqua);
    assert_eq!(aqua.first(), Rgb::new(150, 255, 255));
    assert_eq!(aqua.last(), Rgb::new(0, 0, 51));
}

// ============================================================================
// Anchor interpolation tests
// ============================================================================

#[test]
fn test_interpolated_two_anchors_literal_output() {
    // Two points per segment: the lower anchor, one truncated midpoint, and
    // the final anchor.
    let anchors = [Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)];
    let ramp = ColorRamp::from_anchors(&anchors, 2).unwrap();

    assert_eq!(
        ramp.colors(),
        &[
            Rgb::new(255, 0, 0),
            Rgb::new(127, 0, 127),
            Rgb::new(0, 0, 255),
        ]
    );
}

#[test]
fn test_interpolated_point_count() {
    // Distant anchors at 10 points per segment: no truncation collisions,
    // so the ramp is anchor + 9 intermediates + anchor.
    let anchors = [Rgb::new(0, 0, 0), Rgb::new(250, 250, 250)];
    let ramp = ColorRamp::from_anchors(&anchors, 10).unwrap();

    assert_eq!(ramp.len(), 11);
    assert_eq!(ramp.first(), Rgb::new(0, 0, 0));
    assert_eq!(ramp.last(), Rgb::new(250, 250, 250));
    assert_eq!(ramp.color(1), Rgb::new(25, 25, 25));
}

#[test]
fn test_interpolated_duplicate_anchors_collapse() {
    let c = Rgb::new(40, 80, 120);
    let ramp = ColorRamp::from_anchors(&[c, c], 10).unwrap();
    assert_eq!(ramp.colors(), &[c]);
}

#[test]
fn test_interpolated_near_anchors_dedup_intermediates() {
    // Anchors one step apart: every truncated intermediate equals the lower
    // anchor and is skipped.
    let a = Rgb::new(10, 10, 10);
    let b = Rgb::new(11, 10, 10);
    let ramp = ColorRamp::from_anchors(&[a, b], 4).unwrap();
    assert_eq!(ramp.colors(), &[a, b]);
}

#[test]
fn test_interpolated_single_anchor() {
    let c = Rgb::new(1, 2, 3);
    let ramp = ColorRamp::from_anchors(&[c], 10).unwrap();
    assert_eq!(ramp.colors(), &[c]);
}

#[test]
fn test_interpolated_three_anchors_keeps_middle() {
    let anchors = [Rgb::new(0, 0, 0), Rgb::new(100, 0, 0), Rgb::new(200, 0, 0)];
    let ramp = ColorRamp::from_anchors(&anchors, 2).unwrap();

    assert_eq!(
        ramp.colors(),
        &[
            Rgb::new(0, 0, 0),
            Rgb::new(50, 0, 0),
            Rgb::new(100, 0, 0),
            Rgb::new(150, 0, 0),
            Rgb::new(200, 0, 0),
        ]
    );
}

// ============================================================================
// Validation tests
// ============================================================================

#[test]
fn test_interpolated_rejects_empty_anchors() {
    let err = ColorRamp::from_anchors(&[], 10).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidInput(_)));
}

#[test]
fn test_interpolated_rejects_zero_resolution() {
    let anchors = [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)];
    let err = ColorRamp::from_anchors(&anchors, 0).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidInput(_)));
}
