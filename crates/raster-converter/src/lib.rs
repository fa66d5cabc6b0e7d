//! Conversion orchestration: resolve a value range across the requested
//! rasters, bind a color ramp to it, stream records through the document
//! assemblers, and embed the legend.

pub mod converter;
pub mod grass;
pub mod range;

pub use converter::{ConversionOptions, LegendKind, OverlayOptions, RasterConverter};
pub use grass::{arc_info_to_grass_ascii, GRASS_ASCII_DATA_TYPES};
pub use range::resolve_range;
