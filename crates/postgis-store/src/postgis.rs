//! PostGIS-backed raster store.
//!
//! All statements address band 1. Table and column names come from the
//! caller-supplied [`RasterLocator`] and are interpolated into statements
//! (identifiers cannot be bound); values are bound parameters.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

use kml_common::{CellRecord, ClusterRecord, ConvertError, ConvertResult, LatLonBox, RasterStats};

use crate::store::{GdalDriver, RasterLocator, RasterStore, ResampleMethod};

/// Raster store over a PostGIS connection pool.
pub struct PgRasterStore {
    pool: PgPool,
}

impl PgRasterStore {
    /// Connect from a database URL.
    pub async fn connect(database_url: &str) -> ConvertResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| ConvertError::Database(format!("connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_err(context: &str) -> impl Fn(sqlx::Error) -> ConvertError + '_ {
    move |e| ConvertError::Database(format!("{context}: {e}"))
}

#[async_trait]
impl RasterStore for PgRasterStore {
    async fn raster_stats(
        &self,
        locator: &RasterLocator<'_>,
        raster_ids: &[i32],
        no_data_value: f64,
    ) -> ConvertResult<Vec<RasterStats>> {
        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        // The sentinel must be on the band before summary stats will
        // exclude it.
        let update = format!(
            "UPDATE {table} SET {raster_column} = \
             ST_SetBandNoDataValue({raster_column}, 1, $1) WHERE {id_column} = $2"
        );

        for &raster_id in raster_ids {
            sqlx::query(&update)
                .bind(no_data_value)
                .bind(raster_id)
                .execute(&self.pool)
                .await
                .map_err(db_err("set no-data value"))?;
        }

        let select = format!(
            "SELECT {id_column} AS raster_id, (stats).min, (stats).max \
             FROM ( \
                 SELECT {id_column}, ST_SummaryStats({raster_column}, 1, true) AS stats \
                 FROM {table} WHERE {id_column} = ANY($1) \
             ) AS per_raster"
        );

        let rows = sqlx::query(&select)
            .bind(raster_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("summary stats"))?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in rows {
            stats.push(RasterStats {
                raster_id: row.try_get("raster_id").map_err(db_err("summary stats"))?,
                min: row.try_get("min").map_err(db_err("summary stats"))?,
                max: row.try_get("max").map_err(db_err("summary stats"))?,
            });
        }

        debug!(rasters = raster_ids.len(), "collected raster stats");
        Ok(stats)
    }

    async fn cell_polygons(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<Vec<CellRecord>> {
        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        let statement = format!(
            "SELECT x, y, val, ST_AsKML(geom) AS polygon \
             FROM ( \
                 SELECT (ST_PixelAsPolygons({raster_column})).* \
                 FROM {table} WHERE {id_column} = $1 \
             ) AS cells \
             ORDER BY val"
        );

        let rows = sqlx::query(&statement)
            .bind(raster_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("pixel polygons"))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(CellRecord {
                column: row.try_get("x").map_err(db_err("pixel polygons"))?,
                row: row.try_get("y").map_err(db_err("pixel polygons"))?,
                value: row.try_get("val").map_err(db_err("pixel polygons"))?,
                polygon: row.try_get("polygon").map_err(db_err("pixel polygons"))?,
            });
        }

        Ok(records)
    }

    async fn clustered_polygons(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<Vec<ClusterRecord>> {
        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        let statement = format!(
            "SELECT val, ST_AsKML(geom) AS polygon \
             FROM ( \
                 SELECT (ST_DumpAsPolygons({raster_column})).* \
                 FROM {table} WHERE {id_column} = $1 \
             ) AS clusters \
             ORDER BY val"
        );

        let rows = sqlx::query(&statement)
            .bind(raster_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("cluster polygons"))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(ClusterRecord {
                value: row.try_get("val").map_err(db_err("cluster polygons"))?,
                polygon: row.try_get("polygon").map_err(db_err("cluster polygons"))?,
            });
        }

        Ok(records)
    }

    async fn overlay_pngs(
        &self,
        locator: &RasterLocator<'_>,
        raster_ids: &[i32],
        colorizer_ramp: &str,
        cell_size: Option<f64>,
        resample: ResampleMethod,
    ) -> ConvertResult<Vec<Vec<u8>>> {
        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        // One query per raster keeps images aligned with the input order,
        // which animation frames rely on.
        let statement = match cell_size {
            Some(_) => format!(
                "SELECT ST_AsPNG(ST_Transform(ST_ColorMap( \
                     ST_Rescale({raster_column}, $2, '{resample}'), 1, $3 \
                 ), 4326, 'Bilinear')) AS png \
                 FROM {table} WHERE {id_column} = $1",
                resample = resample.as_sql()
            ),
            None => format!(
                "SELECT ST_AsPNG(ST_Transform(ST_ColorMap({raster_column}, 1, $2), \
                     4326, 'Bilinear')) AS png \
                 FROM {table} WHERE {id_column} = $1"
            ),
        };

        let mut images = Vec::with_capacity(raster_ids.len());
        for &raster_id in raster_ids {
            let query = sqlx::query(&statement).bind(raster_id);
            let query = match cell_size {
                Some(size) => query.bind(size).bind(colorizer_ramp),
                None => query.bind(colorizer_ramp),
            };

            let row = query
                .fetch_one(&self.pool)
                .await
                .map_err(db_err("render png"))?;
            images.push(row.try_get("png").map_err(db_err("render png"))?);
        }

        debug!(rasters = raster_ids.len(), "rendered overlay images");
        Ok(images)
    }

    async fn bounding_box(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<LatLonBox> {
        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        let statement = format!(
            "SELECT (meta).upperleftx, (meta).upperlefty, (meta).scalex, \
                    (meta).scaley, (meta).width, (meta).height \
             FROM ( \
                 SELECT ST_MetaData(ST_Transform({raster_column}, 4326, 'Bilinear')) AS meta \
                 FROM {table} WHERE {id_column} = $1 \
             ) AS metadata"
        );

        let row = sqlx::query(&statement)
            .bind(raster_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("raster metadata"))?;

        let upper_left_x: f64 = row.try_get("upperleftx").map_err(db_err("raster metadata"))?;
        let upper_left_y: f64 = row.try_get("upperlefty").map_err(db_err("raster metadata"))?;
        let scale_x: f64 = row.try_get("scalex").map_err(db_err("raster metadata"))?;
        let scale_y: f64 = row.try_get("scaley").map_err(db_err("raster metadata"))?;
        let width: i32 = row.try_get("width").map_err(db_err("raster metadata"))?;
        let height: i32 = row.try_get("height").map_err(db_err("raster metadata"))?;

        Ok(LatLonBox::from_raster_metadata(
            upper_left_x,
            upper_left_y,
            scale_x,
            scale_y,
            width as u32,
            height as u32,
        ))
    }

    async fn unique_values(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
    ) -> ConvertResult<Vec<f64>> {
        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        let statement = format!(
            "SELECT (pvc).value AS value \
             FROM ( \
                 SELECT ST_ValueCount({raster_column}) AS pvc \
                 FROM {table} WHERE {id_column} = $1 \
             ) AS counts \
             ORDER BY (pvc).value"
        );

        let rows = sqlx::query(&statement)
            .bind(raster_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("value counts"))?;

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            values.push(row.try_get("value").map_err(db_err("value counts"))?);
        }

        Ok(values)
    }

    async fn gdal_raster(
        &self,
        locator: &RasterLocator<'_>,
        raster_id: i32,
        format: &str,
        srid: Option<i32>,
        options: &[String],
    ) -> ConvertResult<String> {
        let supported = self.supported_gdal_formats().await?;
        if !supported.contains_key(format) {
            return Err(ConvertError::UnsupportedFormat(format!(
                "{format} is not supported by this PostGIS installation"
            )));
        }

        let RasterLocator {
            table,
            id_column,
            raster_column,
        } = *locator;

        let statement = match srid {
            Some(_) => format!(
                "SELECT ST_AsGDALRaster({raster_column}, $2, $3, $4) AS gdal \
                 FROM {table} WHERE {id_column} = $1"
            ),
            None => format!(
                "SELECT ST_AsGDALRaster({raster_column}, $2, $3) AS gdal \
                 FROM {table} WHERE {id_column} = $1"
            ),
        };

        let query = sqlx::query(&statement)
            .bind(raster_id)
            .bind(format)
            .bind(options);
        let query = match srid {
            Some(code) => query.bind(code),
            None => query,
        };

        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("gdal export"))?;
        let bytes: Vec<u8> = row.try_get("gdal").map_err(db_err("gdal export"))?;

        String::from_utf8(bytes)
            .map_err(|_| ConvertError::Load(format!("{format} export is not valid UTF-8")))
    }

    async fn supported_gdal_formats(&self) -> ConvertResult<BTreeMap<String, GdalDriver>> {
        let rows = sqlx::query(
            "SELECT short_name, long_name, create_options \
             FROM st_gdaldrivers() ORDER BY short_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("gdal drivers"))?;

        let mut drivers = BTreeMap::new();
        for row in rows {
            let short_name: String = row.try_get("short_name").map_err(db_err("gdal drivers"))?;
            drivers.insert(
                short_name,
                GdalDriver {
                    description: row.try_get("long_name").map_err(db_err("gdal drivers"))?,
                    create_options: row
                        .try_get("create_options")
                        .map_err(db_err("gdal drivers"))?,
                },
            );
        }

        Ok(drivers)
    }
}
