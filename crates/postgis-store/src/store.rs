//! The raster store capability interface.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kml_common::{CellRecord, ClusterRecord, ConvertError, ConvertResult, LatLonBox, RasterStats};

/// Identifies the rasters a conversion reads: a table, its id column, and
/// its raster column.
#[derive(Debug, Clone, Copy)]
pub struct RasterLocator<'a> {
    pub table: &'a str,
    pub id_column: &'a str,
    pub raster_column: &'a str,
}

impl<'a> RasterLocator<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            id_column: "id",
            raster_column: "raster",
        }
    }

    pub fn with_columns(table: &'a str, id_column: &'a str, raster_column: &'a str) -> Self {
        Self {
            table,
            id_column,
            raster_column,
        }
    }
}

/// Resampling kernel applied when rescaling cells before overlay rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMethod {
    #[default]
    NearestNeighbour,
    Bilinear,
    Cubic,
    CubicSpline,
    Lanczos,
}

impl ResampleMethod {
    /// The name the database-side rescale function expects.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ResampleMethod::NearestNeighbour => "NearestNeighbour",
            ResampleMethod::Bilinear => "Bilinear",
            ResampleMethod::Cubic => "Cubic",
            ResampleMethod::CubicSpline => "CubicSpline",
            ResampleMethod::Lanczos => "Lanczos",
        }
    }
}

impl FromStr for ResampleMethod {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NearestNeighbour" => Ok(ResampleMethod::NearestNeighbour),
            "Bilinear" => Ok(ResampleMethod::Bilinear),
            "Cubic" => Ok(ResampleMethod::Cubic),
            "CubicSpline" => Ok(ResampleMethod::CubicSpline),
            "Lanczos" => Ok(ResampleMethod::Lanczos),
            _ => Err(ConvertError::InvalidInput(format!(
                "unknown resample method '{s}', expected one of NearestNeighbour, \
                 Bilinear, Cubic, CubicSpline, Lanczos"
            ))),
        }
    }
}

/// A GDAL driver description reported by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GdalDriver {
    pub description: String,
    pub create_options: String,
}

/// Capabilities the conversion core needs from the spatial database.
///
/// Implementations own all SQL and geometry work; the core only consumes
/// the typed record shapes. Streams of cell and cluster records are ordered
/// by value ascending and consumed in one pass.
#[async_trait]
pub trait RasterStore {
    /// Set the band-1 no-data sentinel on each raster, then collect its
    /// summary min/max. Min/max are absent for all-no-data rasters.
    async fn raster_stats(
        &self,
        locator: &RasterLocator<'_>,
        raster_ids: &[i32],
        no_data_value: f64,
    ) -> ConvertResult<Vec<RasterStats>>;

    /// Every cell of band 1 as a KML polygon with its grid position,
    /// ordered by value ascending.
    async fn cell_polygons(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<Vec<CellRecord>>;

    /// Adjacent same-valued cells merged into polygons by the store,
    /// ordered by value ascending.
    async fn clustered_polygons(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<Vec<ClusterRecord>>;

    /// Render each raster to a PNG using the colorizer ramp text, optionally
    /// rescaling cells first. One image per id, in input order.
    async fn overlay_pngs(
        &self,
        locator: &RasterLocator<'_>,
        raster_ids: &[i32],
        colorizer_ramp: &str,
        cell_size: Option<f64>,
        resample: ResampleMethod,
    ) -> ConvertResult<Vec<Vec<u8>>>;

    /// Geographic extent of a raster, transformed to EPSG:4326.
    async fn bounding_box(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<LatLonBox>;

    /// Distinct band-1 values in ascending order.
    async fn unique_values(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<Vec<f64>>;

    /// Export a raster through the store's GDAL bridge. `options` are
    /// `KEY=VALUE` driver creation options; `srid` reprojects first.
    async fn gdal_raster(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
        format: &str,
        srid: Option<i32>,
        options: &[String],
    ) -> ConvertResult<String>;

    /// GDAL drivers available in this store installation, keyed by short
    /// name.
    async fn supported_gdal_formats(&self) -> ConvertResult<BTreeMap<String, GdalDriver>>;
}
