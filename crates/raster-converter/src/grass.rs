//! ArcInfo AAIGrid to GRASS ASCII raster conversion.

use kml_common::{ConvertError, ConvertResult};

/// GDAL data types the AAIGrid export accepts.
pub const GRASS_ASCII_DATA_TYPES: &[&str] = &["Int32", "Float32", "Float64"];

const ARC_INFO_HEADER_LINES: usize = 5;

fn header_value(lines: &[&str], index: usize, name: &str) -> ConvertResult<f64> {
    let line = lines
        .get(index)
        .ok_or_else(|| ConvertError::MissingField(format!("AAIGrid header '{name}'")))?;

    let value = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ConvertError::MissingField(format!("AAIGrid header '{name}'")))?;

    value
        .parse()
        .map_err(|_| ConvertError::InvalidNumber(value.to_string()))
}

/// Rewrite an ArcInfo AAIGrid document into GRASS ASCII raster format.
///
/// The AAIGrid header anchors at the lower-left corner with a cell size;
/// GRASS wants the four edge coordinates plus row/column counts. Cell data
/// passes through untouched. An optional `NODATA_value` header line is
/// dropped.
pub fn arc_info_to_grass_ascii(arc_info_grid: &str) -> ConvertResult<String> {
    let lines: Vec<&str> = arc_info_grid.lines().collect();

    let cols = header_value(&lines, 0, "ncols")? as u32;
    let rows = header_value(&lines, 1, "nrows")? as u32;
    let x_ll_corner = header_value(&lines, 2, "xllcorner")?;
    let y_ll_corner = header_value(&lines, 3, "yllcorner")?;
    let cell_size = header_value(&lines, 4, "cellsize")?;

    let mut data_start = ARC_INFO_HEADER_LINES;
    if lines
        .get(data_start)
        .is_some_and(|line| line.contains("NODATA_value"))
    {
        data_start += 1;
    }

    let north = y_ll_corner + cell_size * f64::from(rows);
    let south = y_ll_corner;
    let east = x_ll_corner + cell_size * f64::from(cols);
    let west = x_ll_corner;

    let mut out = vec![
        format!("north: {north}"),
        format!("south: {south}"),
        format!("east: {east}"),
        format!("west: {west}"),
        format!("rows: {rows}"),
        format!("cols: {cols}"),
    ];
    out.extend(lines[data_start..].iter().map(|line| line.to_string()));

    Ok(out.join("\n"))
}
