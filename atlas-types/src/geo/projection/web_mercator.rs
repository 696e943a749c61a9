use std::marker::PhantomData;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;

/// Semi-major axis of the WGS84 ellipsoid, used as the sphere radius.
const RADIUS: f64 = 6_378_137.0;

/// Spherical mercator projection (`EPSG:3857`).
#[derive(Debug, Default, Copy, Clone)]
pub struct WebMercator<In, Out> {
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> WebMercator<In, Out> {
    /// Creates a new projection.
    pub fn new() -> Self {
        Self {
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection for WebMercator<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        let x = RADIUS * input.lon_rad();
        let y = RADIUS
            * (std::f64::consts::FRAC_PI_4 + input.lat_rad() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Out::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        let lat = std::f64::consts::FRAC_PI_2 - 2.0 * (-input.y() / RADIUS).exp().atan();
        let lon = input.x() / RADIUS;

        Some(In::latlon(lat.to_degrees(), lon.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cartesian::{CartesianPoint2d, Point2d};
    use crate::geo::{GeoPoint, GeoPoint2d};
    use crate::latlon;

    #[test]
    fn project_origin() {
        let projection = WebMercator::<GeoPoint2d, Point2d>::new();
        let projected = projection.project(&latlon!(0.0, 0.0)).unwrap();
        assert_relative_eq!(projected.x(), 0.0);
        assert_relative_eq!(projected.y(), 0.0);
    }

    #[test]
    fn project_and_back() {
        let projection = WebMercator::<GeoPoint2d, Point2d>::new();
        let point = latlon!(59.3293, 18.0686);
        let projected = projection.project(&point).unwrap();
        assert_relative_eq!(projected.x(), 2_011_387.35, epsilon = 0.01);

        let unprojected = projection.unproject(&projected).unwrap();
        assert_relative_eq!(unprojected.lat(), point.lat(), epsilon = 1e-9);
        assert_relative_eq!(unprojected.lon(), point.lon(), epsilon = 1e-9);
    }

    #[test]
    fn pole_is_not_projected() {
        let projection = WebMercator::<GeoPoint2d, Point2d>::new();
        assert!(projection.project(&latlon!(90.0, 0.0)).is_none());
    }
}
