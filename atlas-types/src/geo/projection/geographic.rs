use std::marker::PhantomData;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;

/// Plate carrée "projection": longitude becomes `x` and latitude becomes `y`, both in degrees.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeographicProjection<In, Out> {
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeographicProjection<In, Out> {
    /// Creates a new projection.
    pub fn new() -> Self {
        Self {
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for GeographicProjection<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        Some(Out::new(input.lon(), input.lat()))
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        if input.y().abs() > 90.0 {
            return None;
        }

        Some(In::latlon(input.y(), input.x()))
    }
}
