//! Raster-to-KML export tool.
//!
//! Connects to a PostGIS database, converts one raster (or a timestamped
//! sequence) into a KML document, and writes the result to disk. Overlay
//! modes also write the rendered PNG images next to the document, under the
//! names the KML references.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use color_ramp::{ColorRamp, RampName};
use kml_common::{ConvertError, Rgb, TimeStampedRaster};
use postgis_store::{PgRasterStore, RasterLocator, ResampleMethod};
use raster_converter::{ConversionOptions, LegendKind, OverlayOptions, RasterConverter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One polygon per raster cell
    Grid,
    /// Merged polygons for adjacent equal-valued cells
    Clusters,
    /// Ground overlay wrapping a rendered PNG
    Png,
    /// Time-animated grid, one frame per --frame
    GridAnimation,
    /// Time-animated overlays, one frame per --frame
    PngAnimation,
    /// GRASS ASCII raster export (no KML)
    GrassAscii,
}

#[derive(Parser, Debug)]
#[command(name = "kml-export")]
#[command(about = "Convert PostGIS rasters into KML documents")]
struct Args {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Conversion mode
    #[arg(long, value_enum, default_value = "grid")]
    mode: Mode,

    /// Table holding the rasters
    #[arg(long, default_value = "rasters")]
    table: String,

    /// Name of the raster id column
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Name of the raster column
    #[arg(long, default_value = "raster")]
    raster_column: String,

    /// Raster id for single-raster modes
    #[arg(long, default_value = "1")]
    raster_id: i32,

    /// Animation frame spec `<id>@<iso8601>`; repeat per frame, in time
    /// order
    #[arg(long = "frame")]
    frames: Vec<String>,

    /// Built-in color ramp
    #[arg(long, default_value = "hue")]
    ramp: String,

    /// Custom ramp anchor `#RRGGBB`; repeat to interpolate between anchors
    /// (overrides --ramp)
    #[arg(long = "anchor")]
    anchors: Vec<String>,

    /// Interpolated points per anchor segment
    #[arg(long, default_value = "10")]
    points_per_segment: u32,

    /// Fill opacity in [0.0, 1.0]
    #[arg(long, default_value = "1.0")]
    alpha: f64,

    /// No-data sentinel value
    #[arg(long, default_value = "0.0")]
    no_data_value: f64,

    /// Emit a discrete (per-value) legend instead of a continuous one
    #[arg(long)]
    discrete: bool,

    /// KML document name
    #[arg(long, default_value = "default")]
    document_name: String,

    /// Overlay draw order
    #[arg(long, default_value = "0")]
    draw_order: i32,

    /// Resample cells to this size before overlay rendering
    #[arg(long)]
    cell_size: Option<f64>,

    /// Overlay resample method
    #[arg(long, default_value = "NearestNeighbour")]
    resample: String,

    /// Reproject GRASS ASCII export to this SRID
    #[arg(long)]
    srid: Option<i32>,

    /// GRASS ASCII data type (Int32, Float32, Float64)
    #[arg(long)]
    data_type: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "out.kml")]
    output: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn color_ramp(&self) -> Result<ColorRamp> {
        if self.anchors.is_empty() {
            let name = RampName::from_str(&self.ramp)?;
            return Ok(ColorRamp::builtin(name));
        }

        let anchors = self
            .anchors
            .iter()
            .map(|hex| {
                Rgb::from_hex(hex).ok_or_else(|| {
                    ConvertError::InvalidInput(format!("bad anchor color '{hex}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ColorRamp::from_anchors(&anchors, self.points_per_segment)?)
    }

    fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            document_name: self.document_name.clone(),
            alpha: self.alpha,
            no_data_value: self.no_data_value,
            legend: if self.discrete {
                LegendKind::Discrete
            } else {
                LegendKind::Continuous
            },
        }
    }

    fn overlay_options(&self) -> Result<OverlayOptions> {
        Ok(OverlayOptions {
            draw_order: self.draw_order,
            cell_size: self.cell_size,
            resample: ResampleMethod::from_str(&self.resample)?,
        })
    }

    fn parse_frames(&self) -> Result<Vec<TimeStampedRaster>> {
        self.frames
            .iter()
            .map(|spec| TimeStampedRaster::parse(spec).map_err(Into::into))
            .collect()
    }
}

fn write_pngs(output: &Path, images: &[(String, Vec<u8>)]) -> Result<()> {
    let dir = output.parent().unwrap_or_else(|| Path::new("."));

    for (name, bytes) in images {
        let path = dir.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote overlay image");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = PgRasterStore::connect(&args.database_url).await?;
    let converter = RasterConverter::new(store);
    let locator =
        RasterLocator::with_columns(&args.table, &args.id_column, &args.raster_column);

    let ramp = args.color_ramp()?;
    let options = args.conversion_options();

    let document = match args.mode {
        Mode::Grid => {
            converter
                .kml_grid(&locator, args.raster_id, &ramp, &options)
                .await?
        }
        Mode::Clusters => {
            converter
                .kml_clusters(&locator, args.raster_id, &ramp, &options)
                .await?
        }
        Mode::Png => {
            let (document, png) = converter
                .kml_png(
                    &locator,
                    args.raster_id,
                    &ramp,
                    &options,
                    &args.overlay_options()?,
                )
                .await?;
            write_pngs(&args.output, &[("raster.png".to_string(), png)])?;
            document
        }
        Mode::GridAnimation => {
            let frames = args.parse_frames()?;
            converter
                .kml_grid_animation(&locator, &frames, &ramp, &options)
                .await?
        }
        Mode::PngAnimation => {
            let frames = args.parse_frames()?;
            let (document, images) = converter
                .kml_png_animation(&locator, &frames, &ramp, &options, &args.overlay_options()?)
                .await?;

            let named: Vec<(String, Vec<u8>)> = images
                .into_iter()
                .enumerate()
                .map(|(index, bytes)| (format!("raster{index}.png"), bytes))
                .collect();
            write_pngs(&args.output, &named)?;
            document
        }
        Mode::GrassAscii => {
            converter
                .grass_ascii_raster(
                    &locator,
                    args.raster_id,
                    args.srid,
                    args.data_type.as_deref(),
                )
                .await?
        }
    };

    std::fs::write(&args.output, document)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote output");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["kml-export", "--database-url", "postgres://localhost/gis"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_ramp_is_hue() {
        let args = parse(&[]);
        let ramp = args.color_ramp().unwrap();
        assert_eq!(ramp.len(), 67);
    }

    #[test]
    fn test_anchor_colors_override_ramp() {
        let args = parse(&[
            "--anchor",
            "#FF0000",
            "--anchor",
            "#0000FF",
            "--points-per-segment",
            "2",
        ]);
        let ramp = args.color_ramp().unwrap();
        assert_eq!(ramp.len(), 3);
        assert_eq!(ramp.first(), Rgb::new(255, 0, 0));
        assert_eq!(ramp.last(), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_bad_anchor_color_fails() {
        let args = parse(&["--anchor", "#XYZXYZ"]);
        assert!(args.color_ramp().is_err());
    }

    #[test]
    fn test_frame_specs_parse_in_order() {
        let args = parse(&[
            "--mode",
            "grid-animation",
            "--frame",
            "1@2024-01-15T00:00:00",
            "--frame",
            "2@2024-01-15T06:00:00",
        ]);

        let frames = args.parse_frames().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].raster_id, 1);
        assert_eq!(frames[1].raster_id, 2);
    }

    #[test]
    fn test_malformed_frame_spec_fails() {
        let args = parse(&["--frame", "nope"]);
        assert!(args.parse_frames().is_err());
    }

    #[test]
    fn test_discrete_flag_selects_legend() {
        let args = parse(&["--discrete"]);
        assert_eq!(args.conversion_options().legend, LegendKind::Discrete);
    }

    #[test]
    fn test_unknown_resample_method_fails() {
        let args = parse(&["--resample", "Quintic"]);
        assert!(args.overlay_options().is_err());
    }

    #[test]
    fn test_write_pngs_lands_beside_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.kml");

        let images = vec![
            ("raster0.png".to_string(), b"frame0".to_vec()),
            ("raster1.png".to_string(), b"frame1".to_vec()),
        ];
        write_pngs(&output, &images).unwrap();

        assert_eq!(std::fs::read(dir.path().join("raster0.png")).unwrap(), b"frame0");
        assert_eq!(std::fs::read(dir.path().join("raster1.png")).unwrap(), b"frame1");
    }
}
