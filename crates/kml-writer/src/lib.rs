//! KML document assembly.
//!
//! One grouping+styling core ([`PlacemarkGrouper`]) serves the grid,
//! cluster, and animation document variants; [`ground_overlay`] builds the
//! image-overlay variant. [`KmlDocument`] owns the surrounding document
//! skeleton and final serialization.

pub mod document;
pub mod overlay;
pub mod placemarks;

pub use document::{xml_escape, KmlDocument};
pub use overlay::{ground_overlay, GroundOverlayParams};
pub use placemarks::{PlacemarkGrouper, TimeSpan};
