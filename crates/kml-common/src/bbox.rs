//! Geographic extent type for KML overlays.

use serde::{Deserialize, Serialize};

/// A north/south/east/west extent in EPSG:4326 degrees, as used by KML
/// `LatLonBox` elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl LatLonBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Derive the extent from raster metadata: the upper-left corner plus
    /// the signed cell size times the pixel dimensions. `scale_y` is
    /// negative for north-up rasters.
    pub fn from_raster_metadata(
        upper_left_x: f64,
        upper_left_y: f64,
        scale_x: f64,
        scale_y: f64,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            north: upper_left_y,
            south: upper_left_y + scale_y * f64::from(height),
            east: upper_left_x + scale_x * f64::from(width),
            west: upper_left_x,
        }
    }

    /// Width of the extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}
