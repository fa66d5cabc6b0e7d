//! Linear value-to-color mapping over an observed data range.

use kml_common::{ConvertError, ConvertResult, Rgb};

use crate::ramp::ColorRamp;

/// The linear map `ramp_index = trunc(slope * value + intercept)`, derived
/// so `min` maps to index 0 and `max` maps to the last ramp index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearValueMap {
    slope: f64,
    intercept: f64,
    min: f64,
    max: f64,
}

impl LinearValueMap {
    /// Derive the map for a ramp of `ramp_len` colors (at least one) over
    /// `[min, max]`.
    ///
    /// A degenerate range (`min == max`) maps every value to index 0. An
    /// inverted range is a caller error.
    pub fn resolve(ramp_len: usize, min: f64, max: f64) -> ConvertResult<Self> {
        if min > max {
            return Err(ConvertError::InvalidRange { min, max });
        }

        let max_index = (ramp_len - 1) as f64;

        let (slope, intercept) = if min == max {
            (0.0, 0.0)
        } else {
            let slope = max_index / (max - min);
            (slope, max_index - slope * max)
        };

        Ok(Self {
            slope,
            intercept,
            min,
            max,
        })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// True when the range collapsed to a single value and the inverse map
    /// is undefined.
    pub fn is_degenerate(&self) -> bool {
        self.slope == 0.0
    }

    /// Ramp index for a value inside `[min, max]`.
    pub fn index_for_value(&self, value: f64) -> usize {
        (self.slope * value + self.intercept).trunc() as usize
    }

    /// The value that maps back to `index` (inverse of the linear map).
    /// Callers must branch on [`Self::is_degenerate`] first.
    pub fn value_for_index(&self, index: usize) -> f64 {
        (index as f64 - self.intercept) / self.slope
    }
}

/// A color ramp bound to a value range and an opacity, read-only for the
/// remainder of a conversion call.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedColorRamp {
    ramp: ColorRamp,
    map: LinearValueMap,
    alpha: f64,
}

impl MappedColorRamp {
    /// Bind `ramp` to `[min, max]` with opacity `alpha` in `[0.0, 1.0]`.
    pub fn new(ramp: ColorRamp, min: f64, max: f64, alpha: f64) -> ConvertResult<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ConvertError::InvalidAlpha(alpha));
        }

        let map = LinearValueMap::resolve(ramp.len(), min, max)?;

        Ok(Self { ramp, map, alpha })
    }

    pub fn ramp(&self) -> &ColorRamp {
        &self.ramp
    }

    pub fn value_map(&self) -> &LinearValueMap {
        &self.map
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Opacity as a byte, for hex color encodings.
    pub fn alpha_byte(&self) -> u8 {
        (self.alpha * 255.0).round() as u8
    }

    /// Color for `value`, saturating at the ramp ends: values above the
    /// range take the last color, values below take the first.
    pub fn color_for_value(&self, value: f64) -> Rgb {
        if value > self.map.max() {
            self.ramp.last()
        } else if value < self.map.min() {
            self.ramp.first()
        } else {
            let index = self.map.index_for_value(value).min(self.ramp.len() - 1);
            self.ramp.color(index)
        }
    }

    /// The ramp specification string consumed by the database-side
    /// colorizer: one `"<value> <r> <g> <b> <alpha255>"` line per ramp
    /// entry, values descending, terminated by the no-data line.
    pub fn colorizer_ramp(&self) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(self.ramp.len() + 1);
        let alpha = self.alpha_byte();

        if self.map.is_degenerate() {
            let rgb = self.ramp.first();
            lines.push(format!(
                "{} {} {} {} {}",
                self.map.max(),
                rgb.r,
                rgb.g,
                rgb.b,
                alpha
            ));
        } else {
            for index in (0..self.ramp.len()).rev() {
                let value = self.map.value_for_index(index);
                let rgb = self.ramp.color(index);
                lines.push(format!("{} {} {} {} {}", value, rgb.r, rgb.g, rgb.b, alpha));
            }
        }

        lines.push("nv 0 0 0 0".to_string());
        lines.join("\n")
    }
}
