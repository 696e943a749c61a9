//! See [`Segment`].

use crate::cartesian::CartesianPoint2d;

/// A straight line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a, Point>(pub &'a Point, pub &'a Point);

impl<'a, P: CartesianPoint2d<Num = f64>> Segment<'a, P> {
    /// Shortest euclidean distance (squared) between a point and the segment:
    ///
    /// * if the normal from the point to the segment ends inside the segment, the returned value is the squared length
    ///   of the normal
    /// * if the normal from the point to the segment ends outside of the segment, the returned value is the smaller one
    ///   of the distances between the point and the segment's endpoints
    pub fn distance_to_point_sq(&self, point: &impl CartesianPoint2d<Num = f64>) -> f64 {
        if self.0.equal(self.1) {
            return self.0.distance_sq(point);
        }

        let (dsx, dsy) = (self.1.x() - self.0.x(), self.1.y() - self.0.y());
        let (dpx, dpy) = (point.x() - self.0.x(), point.y() - self.0.y());
        let ds_len = dsx * dsx + dsy * dsy;

        let r = (dpx * dsx + dpy * dsy) / ds_len;
        if r <= 0.0 {
            self.0.distance_sq(point)
        } else if r >= 1.0 {
            self.1.distance_sq(point)
        } else {
            let s = (dpy * dsx - dpx * dsy) / ds_len;
            (s * s) * ds_len
        }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.0.distance_sq(self.1).sqrt()
    }

    /// Returns true if a horizontal ray cast from `point` to the right crosses the segment.
    ///
    /// Segments touching the ray with their lower endpoint do not count, so a ray passing through a vertex is counted
    /// once.
    pub(crate) fn crosses_ray(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        let (a, b) = (self.0, self.1);
        if (a.y() > point.y()) == (b.y() > point.y()) {
            return false;
        }

        let x_at = a.x() + (point.y() - a.y()) * (b.x() - a.x()) / (b.y() - a.y());
        point.x() < x_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn distance_to_point_sq() {
        let a = Point2d::new(0.0, 0.0);
        let b = Point2d::new(2.0, 0.0);
        let segment = Segment(&a, &b);

        assert_eq!(segment.distance_to_point_sq(&Point2d::new(1.0, 1.0)), 1.0);
        assert_eq!(segment.distance_to_point_sq(&Point2d::new(-1.0, 0.0)), 1.0);
        assert_eq!(segment.distance_to_point_sq(&Point2d::new(3.0, 1.0)), 2.0);
        assert_eq!(segment.length(), 2.0);
    }

    #[test]
    fn degenerate_segment() {
        let a = Point2d::new(1.0, 1.0);
        let segment = Segment(&a, &a);
        assert_eq!(segment.distance_to_point_sq(&Point2d::new(1.0, 3.0)), 4.0);
    }
}
