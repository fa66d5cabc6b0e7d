//! Color ramp construction: built-in ramps and anchor interpolation.

use std::str::FromStr;

use tracing::debug;

use kml_common::{ConvertError, ConvertResult, Rgb};

/// Identifier for one of the built-in hand-authored ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampName {
    Hue,
    Terrain,
    Aqua,
}

impl FromStr for RampName {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hue" => Ok(RampName::Hue),
            "terrain" => Ok(RampName::Terrain),
            "aqua" => Ok(RampName::Aqua),
            _ => Err(ConvertError::UnknownRamp(s.to_string())),
        }
    }
}

/// Magenta through blue, cyan, green, yellow and orange to red.
const HUE: &[(u8, u8, u8)] = &[
    // magenta to blue
    (255, 0, 255), (231, 0, 255), (208, 0, 255), (185, 0, 255), (162, 0, 255), (139, 0, 255),
    (115, 0, 255), (92, 0, 255), (69, 0, 255), (46, 0, 255), (23, 0, 255),
    // blue to cyan
    (0, 0, 255), (0, 23, 255), (0, 46, 255), (0, 69, 255), (0, 92, 255), (0, 115, 255),
    (0, 139, 255), (0, 162, 255), (0, 185, 255), (0, 208, 255), (0, 231, 255),
    // cyan to green
    (0, 255, 255), (0, 255, 231), (0, 255, 208), (0, 255, 185), (0, 255, 162), (0, 255, 139),
    (0, 255, 115), (0, 255, 92), (0, 255, 69), (0, 255, 46), (0, 255, 23),
    // green to yellow
    (0, 255, 0), (23, 255, 0), (46, 255, 0), (69, 255, 0), (92, 255, 0), (115, 255, 0),
    (139, 255, 0), (162, 255, 0), (185, 255, 0), (208, 255, 0), (231, 255, 0),
    // yellow to orange
    (255, 255, 0), (255, 243, 0), (255, 231, 0), (255, 220, 0), (255, 208, 0), (255, 197, 0),
    (255, 185, 0), (255, 174, 0), (255, 162, 0), (255, 151, 0), (255, 139, 0),
    // orange to red
    (255, 128, 0), (255, 116, 0), (255, 104, 0), (255, 93, 0), (255, 81, 0), (255, 69, 0),
    (255, 58, 0), (255, 46, 0), (255, 34, 0), (255, 23, 0), (255, 11, 0),
    (255, 0, 0),
];

/// Dark green over golden rod and browns up to white, for elevation data.
const TERRAIN: &[(u8, u8, u8)] = &[
    // dark green to golden rod yellow
    (0, 100, 0), (19, 107, 0), (38, 114, 0), (57, 121, 0), (76, 129, 0), (95, 136, 0),
    (114, 143, 0), (133, 150, 0), (152, 158, 0), (171, 165, 0), (190, 172, 0),
    // golden rod yellow to orange brown
    (210, 180, 0), (210, 167, 5), (210, 155, 10), (210, 142, 15), (210, 130, 20), (210, 117, 25),
    // orange brown to dark brown
    (210, 105, 30), (188, 94, 25), (166, 83, 21), (145, 72, 17), (123, 61, 13), (101, 50, 9),
    // dark brown to white
    (80, 40, 5), (95, 59, 27), (111, 79, 50), (127, 98, 73), (143, 118, 95), (159, 137, 118),
    (175, 157, 141), (191, 176, 164), (207, 196, 186), (223, 215, 209), (239, 235, 232),
    (255, 255, 255),
];

/// Light aqua down to dark navy, for depth data.
const AQUA: &[(u8, u8, u8)] = &[
    // aqua to blue
    (150, 255, 255), (136, 240, 250), (122, 226, 245), (109, 212, 240), (95, 198, 235),
    (81, 184, 230), (68, 170, 225), (54, 156, 220), (40, 142, 215), (27, 128, 210),
    (13, 114, 205),
    // blue to navy blue
    (0, 100, 200), (0, 94, 195), (0, 89, 191), (0, 83, 187), (0, 78, 182), (0, 72, 178),
    (0, 67, 174), (0, 61, 170), (0, 56, 165), (0, 50, 161), (0, 45, 157), (0, 40, 153),
    // navy blue to dark navy blue
    (0, 36, 143), (0, 32, 134), (0, 29, 125), (0, 25, 115), (0, 21, 106), (0, 18, 97),
    (0, 14, 88), (0, 10, 78), (0, 7, 69), (0, 3, 60), (0, 0, 51),
];

/// A non-empty ordered sequence of colors. Index 0 and the last index are
/// the extremes of the mapped value range. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    colors: Vec<Rgb>,
}

impl ColorRamp {
    /// One of the three built-in ramps.
    pub fn builtin(name: RampName) -> Self {
        let table = match name {
            RampName::Hue => HUE,
            RampName::Terrain => TERRAIN,
            RampName::Aqua => AQUA,
        };

        Self {
            colors: table.iter().copied().map(Rgb::from).collect(),
        }
    }

    /// Interpolate a ramp from ordered anchor colors.
    ///
    /// Each consecutive anchor pair contributes the lower anchor followed by
    /// `points_per_segment - 1` channel-wise truncated intermediates; an
    /// intermediate that exactly matches a color already in the ramp is
    /// skipped, as is the final anchor if it is already present. A single
    /// anchor yields a one-color ramp.
    pub fn from_anchors(anchors: &[Rgb], points_per_segment: u32) -> ConvertResult<Self> {
        if anchors.is_empty() {
            return Err(ConvertError::InvalidInput(
                "color ramp anchors must contain at least one color".to_string(),
            ));
        }

        if points_per_segment == 0 {
            return Err(ConvertError::InvalidInput(
                "points_per_segment must be positive".to_string(),
            ));
        }

        let mut colors: Vec<Rgb> = Vec::new();

        for pair in anchors.windows(2) {
            let (bottom, top) = (pair[0], pair[1]);
            colors.push(bottom);

            let steps = f64::from(points_per_segment);
            let r_slope = (f64::from(top.r) - f64::from(bottom.r)) / steps;
            let g_slope = (f64::from(top.g) - f64::from(bottom.g)) / steps;
            let b_slope = (f64::from(top.b) - f64::from(bottom.b)) / steps;

            for point in 1..points_per_segment {
                let p = f64::from(point);
                let color = Rgb::new(
                    (r_slope * p + f64::from(bottom.r)) as u8,
                    (g_slope * p + f64::from(bottom.g)) as u8,
                    (b_slope * p + f64::from(bottom.b)) as u8,
                );

                if !colors.contains(&color) {
                    colors.push(color);
                }
            }
        }

        let last = anchors[anchors.len() - 1];
        if !colors.contains(&last) {
            colors.push(last);
        }

        debug!(colors = colors.len(), "interpolated custom ramp");
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`. Panics when out of range, like slice indexing.
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index]
    }

    pub fn first(&self) -> Rgb {
        self.colors[0]
    }

    pub fn last(&self) -> Rgb {
        self.colors[self.colors.len() - 1]
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}
