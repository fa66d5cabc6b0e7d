//! Common types and utilities shared across all raster-kml crates.

pub mod bbox;
pub mod color;
pub mod error;
pub mod records;
pub mod time;

pub use bbox::LatLonBox;
pub use color::Rgb;
pub use error::{ConvertError, ConvertResult};
pub use records::{CellRecord, ClusterRecord, RasterStats};
pub use time::{frame_delta, kml_timestamp, TimeStampedRaster};
