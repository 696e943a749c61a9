//! Points and rectangles in 2d cartesian (projected) coordinates.

mod point;
mod rect;

pub use nalgebra::Point2;
pub use point::{CartesianPoint2d, NewCartesianPoint2d, Point2d};
pub use rect::Rect;
