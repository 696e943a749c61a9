use nalgebra::{Point2, Scalar};
use num_traits::Float;

/// 2d point with `f64` coordinates.
pub type Point2d = Point2<f64>;

/// Point in 2d cartesian coordinate system.
pub trait CartesianPoint2d {
    /// Numeric type used to represent coordinates.
    type Num: Float;

    /// X coordinate.
    fn x(&self) -> Self::Num;
    /// Y coordinate.
    fn y(&self) -> Self::Num;

    /// Squared euclidean distance to the `other` point.
    fn distance_sq(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> Self::Num {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx * dx + dy * dy
    }

    /// Returns true if both coordinates of the points are exactly equal.
    fn equal(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }
}

/// Point type that can be constructed from its coordinates.
pub trait NewCartesianPoint2d<N = f64>: CartesianPoint2d<Num = N> + Sized {
    /// Creates a new point.
    fn new(x: N, y: N) -> Self;
}

impl<N: Float + Scalar> CartesianPoint2d for Point2<N> {
    type Num = N;

    fn x(&self) -> N {
        self.x
    }

    fn y(&self) -> N {
        self.y
    }
}

impl<T: CartesianPoint2d + ?Sized> CartesianPoint2d for &T {
    type Num = T::Num;

    fn x(&self) -> Self::Num {
        (**self).x()
    }

    fn y(&self) -> Self::Num {
        (**self).y()
    }
}

impl<N: Float + Scalar> NewCartesianPoint2d<N> for Point2<N> {
    fn new(x: N, y: N) -> Self {
        Point2::new(x, y)
    }
}
