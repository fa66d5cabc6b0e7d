//! Color ramps and value-to-color mapping for raster visualization.
//!
//! A [`ColorRamp`] is an ordered sequence of RGB colors. Mapping one onto an
//! observed value range produces a [`MappedColorRamp`], which styles
//! placemarks, renders SLD color-map legends, and emits the ramp
//! specification string consumed by the database-side colorizer.

pub mod labels;
pub mod legend;
pub mod mapped;
pub mod ramp;

pub use labels::format_legend_label;
pub use legend::{continuous_color_map, discrete_color_map};
pub use mapped::{LinearValueMap, MappedColorRamp};
pub use ramp::{ColorRamp, RampName};
