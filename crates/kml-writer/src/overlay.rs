//! Ground-overlay fragments wrapping externally rendered raster images.

use kml_common::time::kml_timestamp;
use kml_common::LatLonBox;

use crate::document::xml_escape;
use crate::placemarks::TimeSpan;

/// Inputs for one `GroundOverlay` element.
#[derive(Debug)]
pub struct GroundOverlayParams<'a> {
    /// Image reference written into the overlay icon, e.g. `raster.png`.
    /// The consumer must store the image bytes under this name.
    pub href: &'a str,
    pub bbox: LatLonBox,
    pub draw_order: i32,
    pub time_span: Option<TimeSpan>,
    /// Colorizer ramp text embedded as metadata so consumers can reproduce
    /// or inspect the styling applied to the image.
    pub colorizer_ramp: Option<&'a str>,
}

fn push_lat_lon_box(xml: &mut String, bbox: &LatLonBox) {
    xml.push_str(&format!(
        "<LatLonBox>\n\
         <north>{}</north>\n\
         <south>{}</south>\n\
         <east>{}</east>\n\
         <west>{}</west>\n\
         </LatLonBox>\n",
        bbox.north, bbox.south, bbox.east, bbox.west
    ));
}

/// Build one `GroundOverlay` fragment: draw order, a `Region` for view
/// culling, the image icon, and the placement box.
pub fn ground_overlay(params: &GroundOverlayParams<'_>) -> String {
    let mut xml = String::from("<GroundOverlay>\n<name>Overlay</name>\n");

    if let Some(span) = &params.time_span {
        xml.push_str(&format!(
            "<TimeSpan><begin>{}</begin><end>{}</end></TimeSpan>\n",
            kml_timestamp(span.begin),
            kml_timestamp(span.end)
        ));
    }

    xml.push_str(&format!("<drawOrder>{}</drawOrder>\n", params.draw_order));

    xml.push_str("<Region>\n");
    push_lat_lon_box(&mut xml, &params.bbox);
    xml.push_str("</Region>\n");

    xml.push_str(&format!(
        "<Icon><href>{}</href></Icon>\n",
        xml_escape(params.href)
    ));

    push_lat_lon_box(&mut xml, &params.bbox);

    if let Some(ramp) = params.colorizer_ramp {
        xml.push_str(&format!(
            "<ExtendedData>\n\
             <Data name=\"colorRamp\"><value>{}</value></Data>\n\
             </ExtendedData>\n",
            xml_escape(ramp)
        ));
    }

    xml.push_str("</GroundOverlay>\n");
    xml
}
