//! KML encoding and decoding of drawn shapes.
//!
//! The writer embeds every shape's [`StyleAttributes`](crate::draw::StyleAttributes) as JSON into the placemark's
//! extended data, so documents exported by the draw tool are restored with exactly the same styling. Documents from
//! other tools are read as well, they just get the default style.

mod coordinates;
mod reader;
mod writer;

pub use coordinates::{format_coordinates, parse_coordinates};
pub use reader::{read_kml, KmlPlacemark};
pub use writer::write_kml;

/// Namespace of KML 2.2 documents.
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
