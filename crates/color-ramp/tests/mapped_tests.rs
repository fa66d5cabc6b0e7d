//! Tests for the linear value map and mapped color ramp.

use color_ramp::{ColorRamp, LinearValueMap, MappedColorRamp, RampName};
use kml_common::{ConvertError, Rgb};

fn hue_over(min: f64, max: f64, alpha: f64) -> MappedColorRamp {
    MappedColorRamp::new(ColorRamp::builtin(RampName::Hue), min, max, alpha).unwrap()
}

// ============================================================================
// LinearValueMap tests
// ============================================================================

#[test]
fn test_resolve_maps_extremes_to_end_indices() {
    let map = LinearValueMap::resolve(67, 10.0, 20.0).unwrap();
    assert_eq!(map.index_for_value(10.0), 0);
    assert_eq!(map.index_for_value(20.0), 66);
}

#[test]
fn test_resolve_degenerate_range() {
    let map = LinearValueMap::resolve(67, 5.0, 5.0).unwrap();
    assert!(map.is_degenerate());
    assert_eq!(map.slope(), 0.0);
    assert_eq!(map.intercept(), 0.0);
    assert_eq!(map.index_for_value(5.0), 0);
    assert_eq!(map.index_for_value(-1000.0), 0);
    assert_eq!(map.index_for_value(1000.0), 0);
}

#[test]
fn test_resolve_rejects_inverted_range() {
    let err = LinearValueMap::resolve(67, 10.0, 0.0).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::InvalidRange { min, max } if min == 10.0 && max == 0.0
    ));
}

#[test]
fn test_inverse_round_trips_indices() {
    let map = LinearValueMap::resolve(35, -4.0, 13.0).unwrap();
    for index in 0..35 {
        let value = map.value_for_index(index);
        assert_eq!(map.index_for_value(value), index, "index {index}");
    }
}

// ============================================================================
// MappedColorRamp tests
// ============================================================================

#[test]
fn test_extremes_take_ramp_endpoints() {
    let ramp = hue_over(0.0, 100.0, 1.0);
    assert_eq!(ramp.color_for_value(0.0), Rgb::new(255, 0, 255));
    assert_eq!(ramp.color_for_value(100.0), Rgb::new(255, 0, 0));
}

#[test]
fn test_out_of_range_saturates() {
    let ramp = hue_over(0.0, 100.0, 1.0);
    // Saturation, not extrapolation
    assert_eq!(ramp.color_for_value(1e9), ramp.ramp().last());
    assert_eq!(ramp.color_for_value(-1e9), ramp.ramp().first());
    assert_eq!(ramp.color_for_value(100.001), ramp.ramp().last());
    assert_eq!(ramp.color_for_value(-0.001), ramp.ramp().first());
}

#[test]
fn test_degenerate_range_uses_first_color() {
    let ramp = hue_over(7.0, 7.0, 1.0);
    assert_eq!(ramp.color_for_value(7.0), ramp.ramp().first());
}

#[test]
fn test_alpha_byte_rounds() {
    assert_eq!(hue_over(0.0, 1.0, 1.0).alpha_byte(), 255);
    assert_eq!(hue_over(0.0, 1.0, 0.0).alpha_byte(), 0);
    assert_eq!(hue_over(0.0, 1.0, 0.5).alpha_byte(), 128);
}

#[test]
fn test_invalid_alpha_rejected() {
    let ramp = ColorRamp::builtin(RampName::Hue);
    let err = MappedColorRamp::new(ramp.clone(), 0.0, 1.0, 1.5).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidAlpha(a) if a == 1.5));

    let err = MappedColorRamp::new(ramp, 0.0, 1.0, -0.1).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidAlpha(_)));
}

// ============================================================================
// Colorizer ramp string tests
// ============================================================================

#[test]
fn test_colorizer_ramp_shape() {
    let ramp = hue_over(0.0, 66.0, 1.0);
    let text = ramp.colorizer_ramp();
    let lines: Vec<&str> = text.lines().collect();

    // One line per ramp color plus the no-data line
    assert_eq!(lines.len(), 68);
    assert_eq!(*lines.last().unwrap(), "nv 0 0 0 0");

    // Values descend from max to min; colors follow the ramp in reverse
    assert_eq!(lines[0], "66 255 0 0 255");
    assert_eq!(lines[66], "0 255 0 255 255");
}

#[test]
fn test_colorizer_ramp_descending_values() {
    let ramp = hue_over(-5.0, 30.0, 0.8);
    let text = ramp.colorizer_ramp();

    let values: Vec<f64> = text
        .lines()
        .filter(|line| !line.starts_with("nv"))
        .map(|line| line.split_whitespace().next().unwrap().parse().unwrap())
        .collect();

    for pair in values.windows(2) {
        assert!(pair[0] > pair[1], "values must descend: {pair:?}");
    }
}

#[test]
fn test_colorizer_ramp_degenerate() {
    let ramp = hue_over(3.0, 3.0, 1.0);
    let text = ramp.colorizer_ramp();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "3 255 0 255 255");
    assert_eq!(lines[1], "nv 0 0 0 0");
}

#[test]
fn test_colorizer_ramp_alpha_encoding() {
    let ramp = hue_over(0.0, 1.0, 0.5);
    let first = ramp.colorizer_ramp();
    let line = first.lines().next().unwrap();
    assert!(line.ends_with(" 128"), "alpha byte in ramp line: {line}");
}
