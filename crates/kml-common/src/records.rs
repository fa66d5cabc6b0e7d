//! Record shapes exchanged with the external raster store.

/// Per-raster summary statistics for band 1. Min/max are absent for rasters
/// whose cells are all no-data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterStats {
    pub raster_id: i32,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One raster cell with its pre-serialized KML polygon.
///
/// `value` is `None` for no-data cells. Streams of these records are ordered
/// by value ascending; that ordering is a contract of the store, not
/// re-checked downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub column: i32,
    pub row: i32,
    pub value: Option<f64>,
    pub polygon: String,
}

/// A merged region of adjacent same-valued cells, already unioned by the
/// store, with its pre-serialized KML polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRecord {
    pub value: Option<f64>,
    pub polygon: String,
}
