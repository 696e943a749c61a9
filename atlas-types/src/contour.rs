//! Open and closed contours (line strings and linear rings).

use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianPoint2d;
use crate::geo::Projection;
use crate::segment::Segment;

/// Open sequence of points, e.g. a line string.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contour<P> {
    points: Vec<P>,
}

impl<P> Contour<P> {
    /// Creates a new open contour.
    pub fn open(points: Vec<P>) -> Self {
        Self { points }
    }

    /// Points of the contour.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Iterates over all segments of the contour.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        self.points.windows(2).map(|w| Segment(&w[0], &w[1]))
    }

    /// Projects all the points of the contour with the given projection.
    pub fn project_points<Out, Proj>(&self, projection: &Proj) -> Option<Contour<Out>>
    where
        Proj: Projection<InPoint = P, OutPoint = Out> + ?Sized,
    {
        let points = self
            .points
            .iter()
            .map(|p| projection.project(p))
            .collect::<Option<Vec<Out>>>()?;
        Some(Contour { points })
    }
}

impl<P: CartesianPoint2d<Num = f64>> Contour<P> {
    /// Total length of the contour.
    pub fn length(&self) -> f64 {
        self.iter_segments().map(|s| s.length()).sum()
    }

    /// Squared distance from the point to the closest segment of the contour. Returns `None` for empty contours.
    pub fn distance_to_point_sq(&self, point: &impl CartesianPoint2d<Num = f64>) -> Option<f64> {
        match self.points.len() {
            0 => None,
            1 => Some(self.points[0].distance_sq(point)),
            _ => self
                .iter_segments()
                .map(|s| s.distance_to_point_sq(point))
                .min_by(f64::total_cmp),
        }
    }
}

/// Closed ring of points. The closing point is not stored: the last point is implicitly connected to the first one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClosedContour<P> {
    /// Points of the contour.
    pub points: Vec<P>,
}

impl<P> ClosedContour<P> {
    /// Creates a new closed contour.
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    /// Iterates over the points, repeating the first point at the end.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &P> {
        self.points.iter().chain(self.points.first())
    }

    /// Iterates over all segments of the ring, including the closing one.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        let closing = match (self.points.last(), self.points.first()) {
            (Some(last), Some(first)) if self.points.len() > 1 => Some(Segment(last, first)),
            _ => None,
        };
        self.points
            .windows(2)
            .map(|w| Segment(&w[0], &w[1]))
            .chain(closing)
    }

    /// Projects all the points of the contour with the given projection.
    pub fn project_points<Out, Proj>(&self, projection: &Proj) -> Option<ClosedContour<Out>>
    where
        Proj: Projection<InPoint = P, OutPoint = Out> + ?Sized,
    {
        let points = self
            .points
            .iter()
            .map(|p| projection.project(p))
            .collect::<Option<Vec<Out>>>()?;
        Some(ClosedContour { points })
    }
}

impl<P: CartesianPoint2d<Num = f64>> ClosedContour<P> {
    /// Creates a ring from a point list, where the last point may repeat the first one (as in WKT, GeoJSON or KML).
    pub fn from_ring(mut points: Vec<P>) -> Self {
        if points.len() > 1 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if first.equal(last) {
                    points.pop();
                }
            }
        }

        Self { points }
    }

    /// Signed area of the ring. Positive for counterclockwise rings.
    pub fn area_signed(&self) -> f64 {
        let mut iter = self.iter_points_closing();
        let Some(mut prev) = iter.next() else {
            return 0.0;
        };

        let mut aggr = 0.0;
        for p in iter {
            aggr += prev.x() * p.y() - p.x() * prev.y();
            prev = p;
        }

        aggr / 2.0
    }

    /// Squared distance from the point to the ring outline.
    pub fn distance_to_point_sq(&self, point: &impl CartesianPoint2d<Num = f64>) -> Option<f64> {
        match self.points.len() {
            0 => None,
            1 => Some(self.points[0].distance_sq(point)),
            _ => self
                .iter_segments()
                .map(|s| s.distance_to_point_sq(point))
                .min_by(f64::total_cmp),
        }
    }
}

impl<P> From<ClosedContour<P>> for Contour<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            points: value.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn iter_points_closing() {
        let contour = ClosedContour::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_points_closing().count(), 3);
        assert_eq!(
            *contour.iter_points_closing().last().unwrap(),
            Point2d::new(0.0, 0.0)
        );
    }

    #[test]
    fn iter_segments() {
        let contour = Contour::open(vec![Point2d::new(0.0, 0.0)]);
        assert_eq!(contour.iter_segments().count(), 0);

        let ring = ClosedContour::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(ring.iter_segments().count(), 2);
        assert_eq!(
            ring.iter_segments().last().unwrap(),
            Segment(&Point2d::new(1.0, 1.0), &Point2d::new(0.0, 0.0))
        );
    }

    #[test]
    fn from_ring_drops_closing_point() {
        let ring = ClosedContour::from_ring(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(0.0, 0.0),
        ]);
        assert_eq!(ring.points.len(), 3);
    }

    #[test]
    fn area() {
        let contour = ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(0.0, 1.0),
            Point2d::new(1.0, 0.0),
        ]);
        assert_eq!(contour.area_signed(), -0.5);

        let contour = ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(0.0, 1.0),
        ]);
        assert_eq!(contour.area_signed(), 0.5);
    }

    #[test]
    fn length() {
        let contour = Contour::open(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(3.0, 4.0),
            Point2d::new(3.0, 10.0),
        ]);
        assert_eq!(contour.length(), 11.0);
    }

    #[test]
    fn distance_to_point() {
        let contour = ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(1.0, 0.0),
        ]);

        assert_eq!(contour.distance_to_point_sq(&Point2d::new(0.5, 0.0)), Some(0.0));
        assert_eq!(contour.distance_to_point_sq(&Point2d::new(2.0, 2.0)), Some(2.0));
        assert_eq!(contour.distance_to_point_sq(&Point2d::new(-2.0, -2.0)), Some(8.0));
    }
}
