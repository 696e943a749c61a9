use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Point2d};
use crate::contour::ClosedContour;

/// Axis aligned rectangle, used as a bounding box of geometries and map views.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle. The coordinates are normalized, so the order of the corners does not matter.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Creates a rectangle with the given center and half-sizes.
    pub fn from_center(
        center: &impl CartesianPoint2d<Num = f64>,
        half_width: f64,
        half_height: f64,
    ) -> Self {
        Self::new(
            center.x() - half_width,
            center.y() - half_height,
            center.x() + half_width,
            center.y() + half_height,
        )
    }

    /// Smallest rectangle containing all the given points. Returns `None` if the iterator is empty.
    pub fn from_points<'a, P: CartesianPoint2d<Num = f64> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::new(first.x(), first.y(), first.x(), first.y());
        for p in points {
            rect.x_min = rect.x_min.min(p.x());
            rect.y_min = rect.y_min.min(p.y());
            rect.x_max = rect.x_max.max(p.x());
            rect.y_max = rect.y_max.max(p.y());
        }

        Some(rect)
    }

    /// Minimum x.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Minimum y.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum x.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Maximum y.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point.
    pub fn center(&self) -> Point2d {
        Point2d::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Returns true if the point is inside the rectangle or on its border.
    pub fn contains(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        point.x() >= self.x_min
            && point.x() <= self.x_max
            && point.y() >= self.y_min
            && point.y() <= self.y_max
    }

    /// Converts the rectangle into a closed contour, starting from the bottom-left corner going clockwise.
    pub fn into_contour(self) -> ClosedContour<Point2d> {
        ClosedContour::new(vec![
            Point2d::new(self.x_min, self.y_min),
            Point2d::new(self.x_min, self.y_max),
            Point2d::new(self.x_max, self.y_max),
            Point2d::new(self.x_max, self.y_min),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_corners() {
        let rect = Rect::new(10.0, 5.0, 0.0, -5.0);
        assert_eq!(rect.x_min(), 0.0);
        assert_eq!(rect.y_min(), -5.0);
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 10.0);
        assert_eq!(rect.center(), Point2d::new(5.0, 0.0));
    }

    #[test]
    fn from_points() {
        let points = [
            Point2d::new(1.0, 3.0),
            Point2d::new(-1.0, 0.0),
            Point2d::new(4.0, 2.0),
        ];
        let rect = Rect::from_points(points.iter()).unwrap();
        assert_eq!(rect, Rect::new(-1.0, 0.0, 4.0, 3.0));
        assert!(Rect::from_points(Vec::<Point2d>::new().iter()).is_none());
    }
}
