//! KML document skeleton and serialization.

/// Escape text for use in XML content and attribute values.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }

    out
}

/// An incrementally built KML document. Fragments (placemarks, overlays,
/// legends) are appended in order; [`KmlDocument::finish`] closes the tree
/// and yields the UTF-8 text. Not reusable after serialization.
#[derive(Debug)]
pub struct KmlDocument {
    xml: String,
}

impl KmlDocument {
    pub fn new(name: &str) -> Self {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <kml xmlns=\"http://www.opengis.net/kml/2.2\">\n\
             <Document>\n",
        );
        xml.push_str(&format!("<name>{}</name>\n", xml_escape(name)));

        Self { xml }
    }

    /// Append a pre-rendered KML fragment (placemark, overlay, or legend).
    pub fn push_fragment(&mut self, fragment: &str) {
        self.xml.push_str(fragment);
    }

    /// Shared list style that stops per-frame placemarks from flooding the
    /// client's legend panel; used by the animation variants.
    pub fn push_hide_children_style(&mut self) {
        self.xml.push_str(
            "<Style id=\"check-hide-children\">\n\
             <ListStyle><listItemType>checkHideChildren</listItemType></ListStyle>\n\
             </Style>\n\
             <styleUrl>#check-hide-children</styleUrl>\n",
        );
    }

    pub fn finish(mut self) -> String {
        self.xml.push_str("</Document>\n</kml>\n");
        self.xml
    }
}
