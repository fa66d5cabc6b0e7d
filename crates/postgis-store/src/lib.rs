//! The raster store boundary: a capability trait over the spatial database
//! plus the PostGIS implementation, raster loading, and spatial-reference
//! lookup.

pub mod loader;
pub mod postgis;
pub mod srid;
pub mod store;

pub use loader::{RasterFile, RasterLoader};
pub use postgis::PgRasterStore;
pub use srid::lookup_spatial_reference_id;
pub use store::{GdalDriver, RasterLocator, RasterStore, ResampleMethod};
