use std::marker::PhantomData;

use geodesy::prelude::*;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;

/// Projection backed by a [`geodesy`] operator, e.g. `utm zone=33`.
pub struct GeodesyProjection<In, Out> {
    context: Minimal,
    op: OpHandle,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeodesyProjection<In, Out> {
    /// Creates a projection from the operator definition. Returns `None` if the definition cannot be parsed.
    pub fn new(definition: &str) -> Option<Self> {
        let mut context = Minimal::new();
        let op = context.op(definition).ok()?;
        Some(Self {
            context,
            op,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        })
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for GeodesyProjection<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &In) -> Option<Out> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(Out::new(data[0].0[0], data[0].0[1]))
    }

    fn unproject(&self, input: &Out) -> Option<In> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        Some(In::latlon(
            data[0].0[1].to_degrees(),
            data[0].0[0].to_degrees(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cartesian::Point2d;
    use crate::geo::{GeoPoint, GeoPoint2d};
    use crate::latlon;

    #[test]
    fn utm_round_trip() {
        let projection = GeodesyProjection::<GeoPoint2d, Point2d>::new("utm zone=33").unwrap();
        let point = latlon!(59.3293, 18.0686);
        let projected = projection.project(&point).unwrap();
        let unprojected = projection.unproject(&projected).unwrap();

        assert_relative_eq!(unprojected.lat(), point.lat(), epsilon = 1e-6);
        assert_relative_eq!(unprojected.lon(), point.lon(), epsilon = 1e-6);
    }

    #[test]
    fn invalid_definition() {
        assert!(GeodesyProjection::<GeoPoint2d, Point2d>::new("no_such_operator").is_none());
    }
}
