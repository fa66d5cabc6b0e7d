//! Conversion entry points.
//!
//! Every call resolves its own value range and constructs its own mapped
//! ramp and document tree; there is no state shared between conversions.

use tracing::{debug, info};

use color_ramp::{continuous_color_map, discrete_color_map, ColorRamp, MappedColorRamp};
use kml_common::time::frame_delta;
use kml_common::{ConvertError, ConvertResult, TimeStampedRaster};
use kml_writer::{ground_overlay, GroundOverlayParams, KmlDocument, PlacemarkGrouper, TimeSpan};
use postgis_store::{RasterLocator, RasterStore, ResampleMethod};

use crate::grass::{arc_info_to_grass_ascii, GRASS_ASCII_DATA_TYPES};
use crate::range::resolve_range;

/// Which legend encoding to embed in the finished document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendKind {
    /// One interval entry per ramp color.
    #[default]
    Continuous,
    /// One entry per value actually observed.
    Discrete,
}

/// Options shared by every document variant.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub document_name: String,
    pub alpha: f64,
    pub no_data_value: f64,
    pub legend: LegendKind,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            document_name: "default".to_string(),
            alpha: 1.0,
            no_data_value: 0.0,
            legend: LegendKind::Continuous,
        }
    }
}

/// Options specific to the image-overlay variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayOptions {
    pub draw_order: i32,
    /// Rescale cells to this size (in raster CRS units) before rendering.
    pub cell_size: Option<f64>,
    pub resample: ResampleMethod,
}

/// Converts rasters from a [`RasterStore`] into KML documents.
///
/// The store is the only collaborator; the ramp and options are explicit
/// per-call inputs.
pub struct RasterConverter<S> {
    store: S,
}

impl<S: RasterStore> RasterConverter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Vector grid document: one polygon per raster cell, adjacent
    /// equal-valued cells grouped into shared placemarks.
    pub async fn kml_grid(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
        ramp: &ColorRamp,
        options: &ConversionOptions,
    ) -> ConvertResult<String> {
        let mapped = self
            .mapped_ramp(locator, &[raster_id], ramp, options)
            .await?;

        let records = self.store.cell_polygons(locator, raster_id).await?;
        debug!(records = records.len(), "streaming grid cells");

        let mut grouper = PlacemarkGrouper::new(&mapped);
        for record in &records {
            grouper.push_cell(record);
        }
        let (fragment, unique_values) = grouper.finish();

        let mut document = KmlDocument::new(&options.document_name);
        document.push_fragment(&fragment);
        document.push_fragment(&self.legend(&mapped, unique_values, options));

        info!(raster_id, "assembled grid document");
        Ok(document.finish())
    }

    /// Clustered document: the store merges adjacent equal-valued cells
    /// into polygons; grouping and styling work the same way.
    pub async fn kml_clusters(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
        ramp: &ColorRamp,
        options: &ConversionOptions,
    ) -> ConvertResult<String> {
        let mapped = self
            .mapped_ramp(locator, &[raster_id], ramp, options)
            .await?;

        let records = self.store.clustered_polygons(locator, raster_id).await?;
        debug!(records = records.len(), "streaming clusters");

        let mut grouper = PlacemarkGrouper::new(&mapped);
        for record in &records {
            grouper.push_cluster(record);
        }
        let (fragment, unique_values) = grouper.finish();

        let mut document = KmlDocument::new(&options.document_name);
        document.push_fragment(&fragment);
        document.push_fragment(&self.legend(&mapped, unique_values, options));

        info!(raster_id, "assembled cluster document");
        Ok(document.finish())
    }

    /// Ground-overlay document plus the rendered PNG bytes. The image is
    /// referenced as `raster.png`, so the consumer must store it under that
    /// name. The colorizer ramp used to render it rides along as overlay
    /// metadata.
    pub async fn kml_png(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
        ramp: &ColorRamp,
        options: &ConversionOptions,
        overlay: &OverlayOptions,
    ) -> ConvertResult<(String, Vec<u8>)> {
        let mapped = self
            .mapped_ramp(locator, &[raster_id], ramp, options)
            .await?;
        let ramp_text = mapped.colorizer_ramp();

        let images = self
            .store
            .overlay_pngs(
                locator,
                &[raster_id],
                &ramp_text,
                overlay.cell_size,
                overlay.resample,
            )
            .await?;
        let png = images.into_iter().next().ok_or_else(|| {
            ConvertError::Database(format!("no image rendered for raster {raster_id}"))
        })?;

        let bbox = self.store.bounding_box(locator, raster_id).await?;

        let mut document = KmlDocument::new(&options.document_name);
        document.push_fragment(&ground_overlay(&GroundOverlayParams {
            href: "raster.png",
            bbox,
            draw_order: overlay.draw_order,
            time_span: None,
            colorizer_ramp: Some(&ramp_text),
        }));

        let legend = match options.legend {
            LegendKind::Continuous => continuous_color_map(&mapped, options.no_data_value),
            LegendKind::Discrete => {
                let values = self.store.unique_values(locator, raster_id).await?;
                discrete_color_map(&mapped, &values, options.no_data_value)
            }
        };
        document.push_fragment(&legend);

        info!(raster_id, "assembled overlay document");
        Ok((document.finish(), png))
    }

    /// Grid animation: one set of grouped placemarks per frame, each bound
    /// to a presentation window of `[timestamp - dt, timestamp]`, where
    /// `dt` is the spacing of the first two frames. One color ramp spans
    /// the value range of all frames.
    pub async fn kml_grid_animation(
        &self,
        locator: &RasterLocator<'_>,
        frames: &[TimeStampedRaster],
        ramp: &ColorRamp,
        options: &ConversionOptions,
    ) -> ConvertResult<String> {
        let ids = frame_ids(frames)?;
        let mapped = self.mapped_ramp(locator, &ids, ramp, options).await?;
        let delta = frame_delta(frames);

        let mut document = KmlDocument::new(&options.document_name);
        document.push_hide_children_style();

        let mut unique_values: Vec<f64> = Vec::new();

        for frame in frames {
            let time_span = delta.map(|dt| TimeSpan {
                begin: frame.timestamp - dt,
                end: frame.timestamp,
            });

            let mut grouper = match time_span {
                Some(span) => PlacemarkGrouper::with_time_span(&mapped, span),
                None => PlacemarkGrouper::new(&mapped),
            };

            let records = self.store.cell_polygons(locator, frame.raster_id).await?;
            for record in &records {
                grouper.push_cell(record);
            }

            let (fragment, frame_values) = grouper.finish();
            document.push_fragment(&fragment);

            for value in frame_values {
                if !unique_values.contains(&value) {
                    unique_values.push(value);
                }
            }
        }

        document.push_fragment(&self.legend(&mapped, unique_values, options));

        info!(frames = frames.len(), "assembled grid animation");
        Ok(document.finish())
    }

    /// Overlay animation: one ground overlay per frame referencing
    /// `raster<index>.png`, plus the PNG bytes for each frame in input
    /// order.
    pub async fn kml_png_animation(
        &self,
        locator: &RasterLocator<'_>,
        frames: &[TimeStampedRaster],
        ramp: &ColorRamp,
        options: &ConversionOptions,
        overlay: &OverlayOptions,
    ) -> ConvertResult<(String, Vec<Vec<u8>>)> {
        let ids = frame_ids(frames)?;
        let mapped = self.mapped_ramp(locator, &ids, ramp, options).await?;
        let ramp_text = mapped.colorizer_ramp();

        let images = self
            .store
            .overlay_pngs(
                locator,
                &ids,
                &ramp_text,
                overlay.cell_size,
                overlay.resample,
            )
            .await?;

        // All frames share the first raster's extent.
        let bbox = self.store.bounding_box(locator, ids[0]).await?;
        let delta = frame_delta(frames);

        let mut document = KmlDocument::new(&options.document_name);
        document.push_hide_children_style();

        for (index, frame) in frames.iter().enumerate() {
            let time_span = delta.map(|dt| TimeSpan {
                begin: frame.timestamp - dt,
                end: frame.timestamp,
            });

            document.push_fragment(&ground_overlay(&GroundOverlayParams {
                href: &format!("raster{index}.png"),
                bbox,
                draw_order: overlay.draw_order,
                time_span,
                colorizer_ramp: None,
            }));
        }

        // The discrete encoding has no observed-value source here; it
        // carries only the no-data entry.
        let legend = match options.legend {
            LegendKind::Continuous => continuous_color_map(&mapped, options.no_data_value),
            LegendKind::Discrete => discrete_color_map(&mapped, &[], options.no_data_value),
        };
        document.push_fragment(&legend);

        info!(frames = frames.len(), "assembled overlay animation");
        Ok((document.finish(), images))
    }

    /// Export a raster as a GRASS ASCII grid, optionally reprojected, by
    /// re-headering the store's AAIGrid export.
    pub async fn grass_ascii_raster(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
        new_srid: Option<i32>,
        data_type: Option<&str>,
    ) -> ConvertResult<String> {
        let mut gdal_options = Vec::new();

        if let Some(data_type) = data_type {
            if !GRASS_ASCII_DATA_TYPES.contains(&data_type) {
                return Err(ConvertError::InvalidInput(format!(
                    "'{data_type}' is not a valid data type; expected one of {}",
                    GRASS_ASCII_DATA_TYPES.join(", ")
                )));
            }
            gdal_options.push(format!("AAIGRID_DATATYPE={data_type}"));
        }

        let grid = self
            .store
            .gdal_raster(locator, raster_id, "AAIGrid", new_srid, &gdal_options)
            .await?;

        arc_info_to_grass_ascii(&grid)
    }

    /// Resolve the value range across `raster_ids` and bind the ramp to it.
    /// Alpha is validated before the store is touched.
    async fn mapped_ramp(
        &self,
        locator: &RasterLocator<'_>,
        raster_ids: &[i32],
        ramp: &ColorRamp,
        options: &ConversionOptions,
    ) -> ConvertResult<MappedColorRamp> {
        if !(0.0..=1.0).contains(&options.alpha) {
            return Err(ConvertError::InvalidAlpha(options.alpha));
        }

        let stats = self
            .store
            .raster_stats(locator, raster_ids, options.no_data_value)
            .await?;
        let (min, max) = resolve_range(&stats);
        debug!(min, max, "resolved value range");

        MappedColorRamp::new(ramp.clone(), min, max, options.alpha)
    }

    fn legend(
        &self,
        mapped: &MappedColorRamp,
        mut unique_values: Vec<f64>,
        options: &ConversionOptions,
    ) -> String {
        match options.legend {
            LegendKind::Continuous => continuous_color_map(mapped, options.no_data_value),
            LegendKind::Discrete => {
                unique_values.sort_by(f64::total_cmp);
                discrete_color_map(mapped, &unique_values, options.no_data_value)
            }
        }
    }
}

fn frame_ids(frames: &[TimeStampedRaster]) -> ConvertResult<Vec<i32>> {
    if frames.is_empty() {
        return Err(ConvertError::InvalidInput(
            "animation requires at least one timestamped raster".to_string(),
        ));
    }

    Ok(frames.iter().map(|frame| frame.raster_id).collect())
}
