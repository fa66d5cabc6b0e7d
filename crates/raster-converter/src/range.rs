//! Aggregating per-raster statistics into a mapping domain.

use tracing::warn;

use kml_common::RasterStats;

/// Fold per-raster min/max pairs into the overall `(min, max)` domain for
/// one shared color ramp (animations span several rasters).
///
/// Rasters whose cells are all no-data contribute nothing. When no minimum
/// is present at all the overall minimum defaults to 0, and when no maximum
/// is present the overall maximum defaults to 1, so an all-no-data input
/// still yields a valid, if arbitrary, mapping.
pub fn resolve_range(stats: &[RasterStats]) -> (f64, f64) {
    let min = stats
        .iter()
        .filter_map(|s| s.min)
        .min_by(f64::total_cmp);
    let max = stats
        .iter()
        .filter_map(|s| s.max)
        .max_by(f64::total_cmp);

    if min.is_none() || max.is_none() {
        warn!("no raster statistics present; falling back to the (0, 1) range");
    }

    (min.unwrap_or(0.0), max.unwrap_or(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(raster_id: i32, min: Option<f64>, max: Option<f64>) -> RasterStats {
        RasterStats {
            raster_id,
            min,
            max,
        }
    }

    #[test]
    fn test_single_raster() {
        assert_eq!(
            resolve_range(&[stats(1, Some(2.0), Some(9.0))]),
            (2.0, 9.0)
        );
    }

    #[test]
    fn test_spans_multiple_rasters() {
        let all = [
            stats(1, Some(5.0), Some(9.0)),
            stats(2, Some(-3.0), Some(4.0)),
            stats(3, Some(0.0), Some(12.0)),
        ];
        assert_eq!(resolve_range(&all), (-3.0, 12.0));
    }

    #[test]
    fn test_all_no_data_defaults() {
        assert_eq!(resolve_range(&[]), (0.0, 1.0));
        assert_eq!(resolve_range(&[stats(1, None, None)]), (0.0, 1.0));
    }

    #[test]
    fn test_partial_stats() {
        let mixed = [stats(1, None, None), stats(2, Some(3.0), Some(7.0))];
        assert_eq!(resolve_range(&mixed), (3.0, 7.0));
    }
}
