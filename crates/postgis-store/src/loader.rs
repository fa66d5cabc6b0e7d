//! Loading raster files into a PostGIS table.
//!
//! Two paths: shelling out to the `raster2pgsql` tool that ships with
//! PostGIS and lifting the well-known-binary value out of the SQL it
//! generates, or building a single-band raster entirely in SQL from a GRASS
//! ASCII file.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tokio::process::Command;
use tracing::{info, warn};

use kml_common::{ConvertError, ConvertResult};

/// Band data types accepted by the in-SQL raster builder.
pub const RASTER_DATA_TYPES: &[&str] = &[
    "1BB", "2BUI", "4BUI", "8BSI", "8BUI", "16BSI", "16BUI", "32BSI", "32BUI", "32BF", "64BF",
];

const GRASS_HEADER_LINES: usize = 6;

/// A raster file queued for loading.
#[derive(Debug, Clone)]
pub struct RasterFile {
    pub path: String,
    /// Spatial reference id; defaults to EPSG:4326.
    pub srid: Option<i32>,
    /// No-data sentinel passed to raster2pgsql; defaults to -1.
    pub no_data: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Loads rasters into a table with `id`/`filename`/`raster`/`timestamp`
/// columns, creating the table when missing.
pub struct RasterLoader {
    pool: PgPool,
    raster2pgsql: String,
}

impl RasterLoader {
    pub fn new(pool: PgPool, raster2pgsql: impl Into<String>) -> Self {
        Self {
            pool,
            raster2pgsql: raster2pgsql.into(),
        }
    }

    /// Load each file into `table` in order.
    pub async fn load(&self, table: &str, rasters: &[RasterFile]) -> ConvertResult<()> {
        self.ensure_table(table).await?;

        for raster in rasters {
            let srid = raster.srid.unwrap_or(4326);
            let no_data = raster.no_data.unwrap_or(-1.0);

            let wkb = self.raster_to_wkb(&raster.path, srid, no_data).await?;

            let filename = raster
                .path
                .rsplit('/')
                .next()
                .unwrap_or(raster.path.as_str());

            let insert = format!(
                "INSERT INTO {table} (filename, raster, timestamp) \
                 VALUES ($1, $2::raster, $3)"
            );
            sqlx::query(&insert)
                .bind(filename)
                .bind(&wkb)
                .bind(raster.timestamp)
                .execute(&self.pool)
                .await
                .map_err(|e| ConvertError::Database(format!("insert raster: {e}")))?;

            info!(filename, "loaded raster");
        }

        Ok(())
    }

    async fn ensure_table(&self, table: &str) -> ConvertResult<()> {
        let statement = format!(
            "CREATE TABLE IF NOT EXISTS {table} ( \
                 id SERIAL PRIMARY KEY, \
                 filename TEXT, \
                 raster RASTER, \
                 timestamp TIMESTAMPTZ \
             )"
        );

        sqlx::query(&statement)
            .execute(&self.pool)
            .await
            .map_err(|e| ConvertError::Database(format!("create raster table: {e}")))?;

        Ok(())
    }

    /// Convert a raster file to hex well-known binary through raster2pgsql.
    ///
    /// The tool emits INSERT SQL; the raster value is the single-quoted hex
    /// literal inside it.
    pub async fn raster_to_wkb(&self, path: &str, srid: i32, no_data: f64) -> ConvertResult<String> {
        let output = Command::new(&self.raster2pgsql)
            .arg("-s")
            .arg(srid.to_string())
            .arg("-N")
            .arg(no_data.to_string())
            .arg(path)
            .arg("n_a")
            .output()
            .await
            .map_err(|e| ConvertError::Load(format!("failed to run raster2pgsql: {e}")))?;

        if !output.status.success() {
            return Err(ConvertError::Load(format!(
                "raster2pgsql failed for {path}: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let sql = String::from_utf8_lossy(&output.stdout);
        extract_wkb_from_sql(&sql, path)
    }

    /// Load a GRASS ASCII raster without raster2pgsql: parse the headers,
    /// then let the database assemble the band.
    pub async fn grass_ascii_to_wkb(
        &self,
        path: &str,
        srid: i32,
        no_data: f64,
        data_type: &str,
    ) -> ConvertResult<String> {
        let contents = tokio::fs::read_to_string(path).await?;
        let headers = GrassHeaders::parse(&contents)?;

        let mut rows = Vec::new();
        for line in contents.lines().skip(GRASS_HEADER_LINES) {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<&str> = line.split_whitespace().collect();
            rows.push(format!("[{}]", row.join(", ")));
        }
        let data_array = format!("[{}]", rows.join(", "));

        self.make_single_band_wkb_raster(&headers.raster_params(), &data_array, no_data, srid, data_type)
            .await
    }

    /// Build a single-band raster in SQL and return its well-known binary.
    async fn make_single_band_wkb_raster(
        &self,
        params: &RasterParams,
        data_array: &str,
        no_data: f64,
        srid: i32,
        data_type: &str,
    ) -> ConvertResult<String> {
        if !RASTER_DATA_TYPES.contains(&data_type) {
            return Err(ConvertError::InvalidInput(format!(
                "'{data_type}' is not a valid raster data type; expected one of {}",
                RASTER_DATA_TYPES.join(", ")
            )));
        }

        let mut cell_size_y = params.cell_size_y;
        if cell_size_y > 0.0 {
            warn!("cell size in the Y direction should be negative; flipping sign");
            cell_size_y = -cell_size_y;
        }

        // The data array is assembled from parsed numeric tokens, so it is
        // safe to interpolate; array literals cannot be bound.
        let statement = format!(
            "SELECT ST_SetValues( \
                 ST_AddBand( \
                     ST_MakeEmptyRaster({width}::integer, {height}::integer, \
                         {upper_left_x}, {upper_left_y}, {cell_size_x}, {cell_size_y}, \
                         0, 0, {srid}::integer), \
                     1::integer, '{data_type}'::text, NULL::double precision, \
                     {no_data}::double precision \
                 ), \
                 1, 1, 1, ARRAY{data_array}::double precision[][] \
             )::text AS raster",
            width = params.width,
            height = params.height,
            upper_left_x = params.upper_left_x,
            upper_left_y = params.upper_left_y,
            cell_size_x = params.cell_size_x,
        );

        let row = sqlx::query(&statement)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ConvertError::Database(format!("build raster: {e}")))?;

        row.try_get::<String, _>("raster")
            .map_err(|e| ConvertError::Database(format!("build raster: {e}")))
    }
}

fn extract_wkb_from_sql(sql: &str, path: &str) -> ConvertResult<String> {
    // Expected shape:
    //   INSERT INTO "n_a" ("rast") VALUES ('0100...87'::raster);
    // The hex WKB is the second single-quote-delimited token.
    sql.split('\'')
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| {
            ConvertError::Load(format!(
                "raster2pgsql output for {path} did not contain a raster value"
            ))
        })
}

#[derive(Debug, PartialEq)]
struct GrassHeaders {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
    rows: u32,
    cols: u32,
}

#[derive(Debug)]
struct RasterParams {
    width: u32,
    height: u32,
    upper_left_x: f64,
    upper_left_y: f64,
    cell_size_x: f64,
    cell_size_y: f64,
}

impl GrassHeaders {
    fn parse(contents: &str) -> ConvertResult<GrassHeaders> {
        let mut north = None;
        let mut south = None;
        let mut east = None;
        let mut west = None;
        let mut rows = None;
        let mut cols = None;

        for line in contents.lines().take(GRASS_HEADER_LINES) {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };

            let key = key.trim_end_matches(':').to_ascii_lowercase();
            match key.as_str() {
                "north" => north = Some(parse_number(value)?),
                "south" => south = Some(parse_number(value)?),
                "east" => east = Some(parse_number(value)?),
                "west" => west = Some(parse_number(value)?),
                "rows" => rows = Some(parse_number(value)? as u32),
                "cols" => cols = Some(parse_number(value)? as u32),
                _ => {}
            }
        }

        let missing = |field: &str| ConvertError::MissingField(format!("GRASS header '{field}'"));

        Ok(GrassHeaders {
            north: north.ok_or_else(|| missing("north"))?,
            south: south.ok_or_else(|| missing("south"))?,
            east: east.ok_or_else(|| missing("east"))?,
            west: west.ok_or_else(|| missing("west"))?,
            rows: rows.ok_or_else(|| missing("rows"))?,
            cols: cols.ok_or_else(|| missing("cols"))?,
        })
    }

    fn raster_params(&self) -> RasterParams {
        let cell_size = (self.west - self.east).abs() / f64::from(self.cols);

        RasterParams {
            width: self.cols,
            height: self.rows,
            upper_left_x: self.west,
            upper_left_y: self.north,
            cell_size_x: cell_size,
            cell_size_y: -cell_size,
        }
    }
}

fn parse_number(value: &str) -> ConvertResult<f64> {
    value
        .parse()
        .map_err(|_| ConvertError::InvalidNumber(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS_FILE: &str = "north: 4501028.97\n\
                              south: 4494548.97\n\
                              east: 460348.28\n\
                              west: 454318.28\n\
                              rows: 72\n\
                              cols: 67\n\
                              1 2 3\n\
                              4 5 6\n";

    #[test]
    fn test_parse_grass_headers() {
        let headers = GrassHeaders::parse(GRASS_FILE).unwrap();
        assert_eq!(headers.north, 4501028.97);
        assert_eq!(headers.rows, 72);
        assert_eq!(headers.cols, 67);
    }

    #[test]
    fn test_grass_headers_missing_field() {
        let err = GrassHeaders::parse("north: 1.0\nsouth: 0.0\n").unwrap_err();
        assert!(matches!(err, ConvertError::MissingField(_)));
    }

    #[test]
    fn test_grass_raster_params() {
        let headers = GrassHeaders::parse(GRASS_FILE).unwrap();
        let params = headers.raster_params();
        assert_eq!(params.width, 67);
        assert_eq!(params.height, 72);
        assert_eq!(params.upper_left_x, 454318.28);
        assert_eq!(params.upper_left_y, 4501028.97);
        assert!(params.cell_size_y < 0.0);
        assert_eq!(params.cell_size_x, -params.cell_size_y);
    }

    #[test]
    fn test_extract_wkb_from_generated_sql() {
        let sql = "BEGIN;\nINSERT INTO \"n_a\" (\"rast\") VALUES ('0100AB56C0'::raster);\nEND;\n";
        assert_eq!(extract_wkb_from_sql(sql, "x.tif").unwrap(), "0100AB56C0");
    }

    #[test]
    fn test_extract_wkb_missing_value() {
        let err = extract_wkb_from_sql("BEGIN;\nEND;\n", "x.tif").unwrap_err();
        assert!(matches!(err, ConvertError::Load(_)));
    }
}
