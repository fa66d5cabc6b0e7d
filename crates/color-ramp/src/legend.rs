//! SLD color-map legend fragments.
//!
//! Two encodings: a continuous (interval) map carrying one entry per ramp
//! color at the value that maps back to that index, and a discrete (values)
//! map carrying one entry per observed value. Both lead with a zero-opacity
//! entry for the no-data sentinel.

use crate::labels::format_legend_label;
use crate::mapped::MappedColorRamp;

fn push_entry(xml: &mut String, color: &str, quantity: &str, label: &str, opacity: &str) {
    xml.push_str(&format!(
        "  <ColorMapEntry color=\"{color}\" quantity=\"{quantity}\" label=\"{label}\" opacity=\"{opacity}\"/>\n"
    ));
}

fn push_no_data_entry(xml: &mut String, no_data_value: f64) {
    push_entry(xml, "#000000", &no_data_value.to_string(), "NoData", "0.0");
}

/// Continuous legend: one entry per ramp color, quantities recovered through
/// the inverse of the linear map. A degenerate range emits a single entry
/// for the max value.
pub fn continuous_color_map(mapped: &MappedColorRamp, no_data_value: f64) -> String {
    let mut xml = String::from("<ColorMap type=\"interval\">\n");
    push_no_data_entry(&mut xml, no_data_value);

    let map = mapped.value_map();
    let opacity = mapped.alpha().to_string();

    if map.is_degenerate() {
        let value = map.max();
        push_entry(
            &mut xml,
            &mapped.ramp().first().hex(),
            &value.to_string(),
            &format_legend_label(value),
            &opacity,
        );
    } else {
        for index in 0..mapped.ramp().len() {
            let value = map.value_for_index(index);
            push_entry(
                &mut xml,
                &mapped.ramp().color(index).hex(),
                &value.to_string(),
                &format_legend_label(value),
                &opacity,
            );
        }
    }

    xml.push_str("</ColorMap>\n");
    xml
}

/// Discrete legend: one entry per supplied value, colored through the
/// saturating value lookup. Reflects only values actually observed; no
/// interpolation.
pub fn discrete_color_map(mapped: &MappedColorRamp, values: &[f64], no_data_value: f64) -> String {
    let mut xml = String::from("<ColorMap type=\"values\">\n");
    push_no_data_entry(&mut xml, no_data_value);

    let opacity = mapped.alpha().to_string();

    for &value in values {
        push_entry(
            &mut xml,
            &mapped.color_for_value(value).hex(),
            &value.to_string(),
            &value.to_string(),
            &opacity,
        );
    }

    xml.push_str("</ColorMap>\n");
    xml
}
