//! See [`Polygon`].

use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianPoint2d;
use crate::contour::ClosedContour;
use crate::geo::Projection;

/// Polygon with one outer ring and any number of holes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Polygon<P> {
    /// Outer contour.
    pub outer_contour: ClosedContour<P>,
    /// Inner contours (holes).
    pub inner_contours: Vec<ClosedContour<P>>,
}

impl<P> Polygon<P> {
    /// Creates a new polygon.
    pub fn new(outer_contour: ClosedContour<P>, inner_contours: Vec<ClosedContour<P>>) -> Self {
        Self {
            outer_contour,
            inner_contours,
        }
    }

    /// Iterates over all rings of the polygon, outer ring first.
    pub fn iter_contours(&self) -> impl Iterator<Item = &ClosedContour<P>> {
        std::iter::once(&self.outer_contour).chain(self.inner_contours.iter())
    }

    /// Projects all the points of the polygon with the given projection.
    pub fn project_points<Out, Proj>(&self, projection: &Proj) -> Option<Polygon<Out>>
    where
        Proj: Projection<InPoint = P, OutPoint = Out> + ?Sized,
    {
        Some(Polygon {
            outer_contour: self.outer_contour.project_points(projection)?,
            inner_contours: self
                .inner_contours
                .iter()
                .map(|c| c.project_points(projection))
                .collect::<Option<Vec<_>>>()?,
        })
    }
}

impl<P: CartesianPoint2d<Num = f64>> Polygon<P> {
    /// Returns true if the `point` lies inside the polygon and outside of all its holes.
    ///
    /// Uses the even-odd rule, so holes are excluded regardless of their winding.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        let crossings = self
            .iter_contours()
            .flat_map(|c| c.iter_segments())
            .filter(|s| s.crosses_ray(point))
            .count();
        crossings % 2 == 1
    }

    /// Squared distance from the point to the closest ring of the polygon.
    pub fn distance_to_boundary_sq(&self, point: &impl CartesianPoint2d<Num = f64>) -> Option<f64> {
        self.iter_contours()
            .filter_map(|c| c.distance_to_point_sq(point))
            .min_by(f64::total_cmp)
    }

    /// Planar area of the polygon: area of the outer ring minus areas of the holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .inner_contours
            .iter()
            .map(|c| c.area_signed().abs())
            .sum();
        (self.outer_contour.area_signed().abs() - holes).max(0.0)
    }
}

impl<P> From<ClosedContour<P>> for Polygon<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            outer_contour: value,
            inner_contours: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    fn square(min: f64, max: f64) -> ClosedContour<Point2d> {
        ClosedContour::new(vec![
            Point2d::new(min, min),
            Point2d::new(min, max),
            Point2d::new(max, max),
            Point2d::new(max, min),
        ])
    }

    #[test]
    fn contains_point() {
        let polygon = Polygon::new(square(0.0, 10.0), vec![square(4.0, 6.0)]);

        assert!(polygon.contains_point(&Point2d::new(1.0, 1.0)));
        assert!(polygon.contains_point(&Point2d::new(8.0, 5.0)));
        assert!(!polygon.contains_point(&Point2d::new(5.0, 5.0)));
        assert!(!polygon.contains_point(&Point2d::new(11.0, 5.0)));
        assert!(!polygon.contains_point(&Point2d::new(-1.0, -1.0)));
    }

    #[test]
    fn area_excludes_holes() {
        let polygon = Polygon::new(square(0.0, 10.0), vec![square(4.0, 6.0)]);
        assert_eq!(polygon.area(), 96.0);
    }

    #[test]
    fn distance_to_boundary() {
        let polygon = Polygon::new(square(0.0, 10.0), vec![square(4.0, 6.0)]);
        assert_eq!(
            polygon.distance_to_boundary_sq(&Point2d::new(5.0, 3.0)),
            Some(1.0)
        );
    }
}
