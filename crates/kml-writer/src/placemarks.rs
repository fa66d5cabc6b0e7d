//! The placemark grouping core shared by grid, cluster, and animation
//! documents.

use chrono::{DateTime, Utc};

use color_ramp::MappedColorRamp;
use kml_common::time::kml_timestamp;
use kml_common::{CellRecord, ClusterRecord};

/// Outline color for cell polygons, KML ABGR hex.
const LINE_COLOR: &str = "FF000000";
const LINE_WIDTH: u32 = 1;

/// Presentation time window applied to every placemark of one animation
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug)]
struct OpenGroup {
    value: f64,
    /// (column, row) of the record that opened the group; grid variant only.
    position: Option<(i32, i32)>,
    polygons: Vec<String>,
}

/// Consumes a value-ordered record stream and emits one placemark per
/// adjacent run of equal-valued records.
///
/// No-data records are skipped entirely: they neither open nor extend a
/// group. Value ordering is a precondition of the store contract; if it is
/// violated the grouping silently fragments into more placemarks. Only the
/// currently open group's geometry is buffered.
#[derive(Debug)]
pub struct PlacemarkGrouper<'a> {
    ramp: &'a MappedColorRamp,
    time_span: Option<TimeSpan>,
    current: Option<OpenGroup>,
    unique_values: Vec<f64>,
    xml: String,
}

impl<'a> PlacemarkGrouper<'a> {
    pub fn new(ramp: &'a MappedColorRamp) -> Self {
        Self {
            ramp,
            time_span: None,
            current: None,
            unique_values: Vec::new(),
            xml: String::new(),
        }
    }

    /// Grouper for one animation frame: every emitted placemark carries the
    /// frame's time window and timestamp metadata.
    pub fn with_time_span(ramp: &'a MappedColorRamp, time_span: TimeSpan) -> Self {
        Self {
            time_span: Some(time_span),
            ..Self::new(ramp)
        }
    }

    pub fn push_cell(&mut self, record: &CellRecord) {
        self.push(
            record.value,
            Some((record.column, record.row)),
            &record.polygon,
        );
    }

    pub fn push_cluster(&mut self, record: &ClusterRecord) {
        self.push(record.value, None, &record.polygon);
    }

    fn push(&mut self, value: Option<f64>, position: Option<(i32, i32)>, polygon: &str) {
        let Some(value) = value else {
            return;
        };

        if !self.unique_values.contains(&value) {
            self.unique_values.push(value);
        }

        let same_group = self.current.as_ref().is_some_and(|g| g.value == value);
        if !same_group {
            self.flush();
            self.current = Some(OpenGroup {
                value,
                position,
                polygons: Vec::new(),
            });
        }

        if let Some(group) = self.current.as_mut() {
            group.polygons.push(polygon.to_string());
        }
    }

    fn flush(&mut self) {
        let Some(group) = self.current.take() else {
            return;
        };

        let fill = self
            .ramp
            .color_for_value(group.value)
            .kml_abgr(self.ramp.alpha_byte());

        self.xml.push_str("<Placemark>\n");
        self.xml.push_str(&format!("<name>{}</name>\n", group.value));

        if let Some(span) = &self.time_span {
            self.xml.push_str(&format!(
                "<TimeSpan><begin>{}</begin><end>{}</end></TimeSpan>\n",
                kml_timestamp(span.begin),
                kml_timestamp(span.end)
            ));
        }

        self.xml.push_str(&format!(
            "<Style>\n\
             <LineStyle><color>{LINE_COLOR}</color><width>{LINE_WIDTH}</width></LineStyle>\n\
             <PolyStyle><color>{fill}</color></PolyStyle>\n\
             </Style>\n"
        ));

        self.xml.push_str("<ExtendedData>\n");
        self.xml.push_str(&format!(
            "<Data name=\"value\"><value>{}</value></Data>\n",
            group.value
        ));
        if let Some((column, row)) = group.position {
            self.xml.push_str(&format!(
                "<Data name=\"i\"><value>{column}</value></Data>\n\
                 <Data name=\"j\"><value>{row}</value></Data>\n"
            ));
        }
        if let Some(span) = &self.time_span {
            self.xml.push_str(&format!(
                "<Data name=\"t\"><value>{}</value></Data>\n",
                kml_timestamp(span.end)
            ));
        }
        self.xml.push_str("</ExtendedData>\n");

        self.xml.push_str("<MultiGeometry>\n");
        for polygon in &group.polygons {
            self.xml.push_str(polygon);
            self.xml.push('\n');
        }
        self.xml.push_str("</MultiGeometry>\n");

        self.xml.push_str("</Placemark>\n");
    }

    /// Close the open group and return the placemark fragment together with
    /// the distinct values observed, in first-seen order.
    pub fn finish(mut self) -> (String, Vec<f64>) {
        self.flush();
        (self.xml, self.unique_values)
    }
}
