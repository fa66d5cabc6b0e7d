//! Time handling for raster animation frames.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

use crate::error::{ConvertError, ConvertResult};

/// A raster reference paired with the instant it represents. Animation
/// inputs are sequences of these, sorted by time by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStampedRaster {
    pub raster_id: i32,
    pub timestamp: DateTime<Utc>,
}

impl TimeStampedRaster {
    pub fn new(raster_id: i32, timestamp: DateTime<Utc>) -> Self {
        Self {
            raster_id,
            timestamp,
        }
    }

    /// Parse a frame spec of the form `<id>@<iso8601>`, e.g.
    /// `7@2024-01-15T00:00:00`. Times without an offset are taken as UTC.
    pub fn parse(spec: &str) -> ConvertResult<Self> {
        let (id_part, time_part) = spec
            .split_once('@')
            .ok_or_else(|| ConvertError::MissingField(format!("timestamp in frame spec '{spec}'")))?;

        if id_part.is_empty() {
            return Err(ConvertError::MissingField(format!(
                "raster id in frame spec '{spec}'"
            )));
        }

        let raster_id: i32 = id_part
            .parse()
            .map_err(|_| ConvertError::InvalidNumber(id_part.to_string()))?;

        let timestamp = parse_timestamp(time_part)?;

        Ok(Self {
            raster_id,
            timestamp,
        })
    }
}

fn parse_timestamp(s: &str) -> ConvertResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(ConvertError::InvalidInput(format!(
        "unparseable timestamp '{s}'"
    )))
}

/// Format an instant the way KML `TimeSpan` and `ExtendedData` expect.
pub fn kml_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// The presentation time step for an animation: the difference between the
/// first two frames. Applied to every frame, which assumes uniform spacing.
/// `None` when fewer than two frames are supplied.
pub fn frame_delta(frames: &[TimeStampedRaster]) -> Option<Duration> {
    match frames {
        [first, second, ..] => Some(second.timestamp - first.timestamp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(spec: &str) -> DateTime<Utc> {
        parse_timestamp(spec).unwrap()
    }

    #[test]
    fn test_parse_frame_spec() {
        let frame = TimeStampedRaster::parse("7@2024-01-15T00:00:00").unwrap();
        assert_eq!(frame.raster_id, 7);
        assert_eq!(kml_timestamp(frame.timestamp), "2024-01-15T00:00:00");
    }

    #[test]
    fn test_parse_missing_timestamp() {
        let err = TimeStampedRaster::parse("7").unwrap_err();
        assert!(matches!(err, ConvertError::MissingField(_)));
    }

    #[test]
    fn test_parse_missing_id() {
        let err = TimeStampedRaster::parse("@2024-01-15T00:00:00").unwrap_err();
        assert!(matches!(err, ConvertError::MissingField(_)));
    }

    #[test]
    fn test_parse_bad_id() {
        let err = TimeStampedRaster::parse("seven@2024-01-15T00:00:00").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidNumber(_)));
    }

    #[test]
    fn test_frame_delta_constant_across_frames() {
        let frames = vec![
            TimeStampedRaster::new(1, utc("1970-01-01T00:00:00")),
            TimeStampedRaster::new(2, utc("1970-01-01T06:00:00")),
            // Irregular third frame does not change the delta
            TimeStampedRaster::new(3, utc("1970-01-02T00:00:00")),
        ];
        assert_eq!(frame_delta(&frames), Some(Duration::hours(6)));
    }

    #[test]
    fn test_frame_delta_single_frame() {
        let frames = vec![TimeStampedRaster::new(1, utc("1970-01-01T00:00:00"))];
        assert_eq!(frame_delta(&frames), None);
    }
}
