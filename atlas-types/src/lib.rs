//! Geometry primitives used by the `atlas` map tools.
//!
//! * [`cartesian`] points and rectangles in projected (map) coordinates,
//! * [`Contour`], [`ClosedContour`], [`Polygon`] and [`MultiPolygon`] containers, generic over the point type,
//! * [`Geom`] enum that unifies them and provides planar measures and hit testing,
//! * [`geo`] module with geographic points, coordinate reference systems and projections between them.

pub mod cartesian;
pub mod contour;
pub mod error;
pub mod geo;
pub mod geometry;
pub mod multi_polygon;
pub mod polygon;
pub mod segment;

pub use contour::{ClosedContour, Contour};
pub use geometry::{Geom, GeometryType};
pub use multi_polygon::MultiPolygon;
pub use polygon::Polygon;
