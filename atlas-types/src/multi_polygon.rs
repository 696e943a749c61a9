//! See [`MultiPolygon`].

use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianPoint2d;
use crate::geo::Projection;
use crate::polygon::Polygon;

/// A set of polygons.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MultiPolygon<P> {
    /// Inner polygons.
    pub parts: Vec<Polygon<P>>,
}

impl<P> From<Vec<Polygon<P>>> for MultiPolygon<P> {
    fn from(parts: Vec<Polygon<P>>) -> Self {
        Self { parts }
    }
}

impl<P> MultiPolygon<P> {
    /// Returns reference to the inner polygons.
    pub fn parts(&self) -> &[Polygon<P>] {
        &self.parts
    }

    /// Projects all the points of all the polygons with the given projection.
    pub fn project_points<Out, Proj>(&self, projection: &Proj) -> Option<MultiPolygon<Out>>
    where
        Proj: Projection<InPoint = P, OutPoint = Out> + ?Sized,
    {
        Some(MultiPolygon {
            parts: self
                .parts
                .iter()
                .map(|p| p.project_points(projection))
                .collect::<Option<Vec<_>>>()?,
        })
    }
}

impl<P: CartesianPoint2d<Num = f64>> MultiPolygon<P> {
    /// Sum of the areas of all parts.
    pub fn area(&self) -> f64 {
        self.parts.iter().map(|p| p.area()).sum()
    }
}
