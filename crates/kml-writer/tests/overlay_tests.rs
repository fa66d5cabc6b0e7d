//! Tests for ground-overlay fragments.

use chrono::{TimeZone, Utc};
use kml_common::LatLonBox;
use kml_writer::{ground_overlay, GroundOverlayParams, KmlDocument, TimeSpan};
use quick_xml::events::Event;
use quick_xml::Reader;

fn bbox() -> LatLonBox {
    LatLonBox::new(45.0, 42.5, -115.0, -120.0)
}

#[test]
fn test_overlay_basic_structure() {
    let xml = ground_overlay(&GroundOverlayParams {
        href: "raster.png",
        bbox: bbox(),
        draw_order: 0,
        time_span: None,
        colorizer_ramp: None,
    });

    assert!(xml.starts_with("<GroundOverlay>"));
    assert!(xml.contains("<name>Overlay</name>"));
    assert!(xml.contains("<drawOrder>0</drawOrder>"));
    assert!(xml.contains("<Icon><href>raster.png</href></Icon>"));
    assert!(xml.contains("<north>45</north>"));
    assert!(xml.contains("<south>42.5</south>"));
    assert!(xml.contains("<east>-115</east>"));
    assert!(xml.contains("<west>-120</west>"));
}

#[test]
fn test_overlay_box_appears_in_region_and_placement() {
    let xml = ground_overlay(&GroundOverlayParams {
        href: "raster.png",
        bbox: bbox(),
        draw_order: 2,
        time_span: None,
        colorizer_ramp: None,
    });

    // Once inside <Region>, once as the overlay placement box
    assert_eq!(xml.matches("<LatLonBox>").count(), 2);
    assert_eq!(xml.matches("<Region>").count(), 1);
}

#[test]
fn test_overlay_embeds_colorizer_ramp_metadata() {
    let ramp = "10 255 0 0 255\n0 0 0 255 255\nnv 0 0 0 0";
    let xml = ground_overlay(&GroundOverlayParams {
        href: "raster.png",
        bbox: bbox(),
        draw_order: 0,
        time_span: None,
        colorizer_ramp: Some(ramp),
    });

    assert!(xml.contains("<Data name=\"colorRamp\">"));
    assert!(xml.contains("nv 0 0 0 0"));
}

#[test]
fn test_overlay_time_span_for_animation_frames() {
    let begin = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap();

    let xml = ground_overlay(&GroundOverlayParams {
        href: "raster3.png",
        bbox: bbox(),
        draw_order: 0,
        time_span: Some(TimeSpan { begin, end }),
        colorizer_ramp: None,
    });

    assert!(xml.contains(
        "<TimeSpan><begin>2024-01-15T00:00:00</begin><end>2024-01-15T06:00:00</end></TimeSpan>"
    ));
    assert!(xml.contains("raster3.png"));
}

#[test]
fn test_overlay_document_is_well_formed() {
    let fragment = ground_overlay(&GroundOverlayParams {
        href: "raster.png",
        bbox: bbox(),
        draw_order: 1,
        time_span: None,
        colorizer_ramp: Some("nv 0 0 0 0"),
    });

    let mut doc = KmlDocument::new("overlay");
    doc.push_fragment(&fragment);
    let text = doc.finish();

    let mut reader = Reader::from_str(&text);
    let mut overlays = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"GroundOverlay" => overlays += 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("document is not well-formed XML: {e}"),
        }
    }
    assert_eq!(overlays, 1);
}
