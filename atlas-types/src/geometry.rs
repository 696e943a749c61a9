//! See [`Geom`].

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::Contour;
use crate::geo::Projection;
use crate::multi_polygon::MultiPolygon;
use crate::polygon::Polygon;

/// Any supported geometry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Geom<P> {
    /// Single point.
    Point(P),
    /// Set of points.
    MultiPoint(Vec<P>),
    /// Line string.
    Contour(Contour<P>),
    /// Set of line strings.
    MultiContour(Vec<Contour<P>>),
    /// Polygon.
    Polygon(Polygon<P>),
    /// Set of polygons.
    MultiPolygon(MultiPolygon<P>),
}

/// Kind of a geometry, named after the OGC simple features types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GeometryType {
    /// Point.
    Point,
    /// Multi point.
    MultiPoint,
    /// Line string.
    LineString,
    /// Multi line string.
    MultiLineString,
    /// Polygon.
    Polygon,
    /// Multi polygon.
    MultiPolygon,
}

impl GeometryType {
    /// Name of the type as used in GeoJSON and KML.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::LineString => "LineString",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }
}

impl<P> Geom<P> {
    /// Type of the geometry.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geom::Point(_) => GeometryType::Point,
            Geom::MultiPoint(_) => GeometryType::MultiPoint,
            Geom::Contour(_) => GeometryType::LineString,
            Geom::MultiContour(_) => GeometryType::MultiLineString,
            Geom::Polygon(_) => GeometryType::Polygon,
            Geom::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Iterates over all the vertices of the geometry. Closing points of rings are not repeated.
    pub fn iter_points(&self) -> Box<dyn Iterator<Item = &P> + '_> {
        match self {
            Geom::Point(p) => Box::new(std::iter::once(p)),
            Geom::MultiPoint(points) => Box::new(points.iter()),
            Geom::Contour(c) => Box::new(c.points().iter()),
            Geom::MultiContour(parts) => Box::new(parts.iter().flat_map(|c| c.points().iter())),
            Geom::Polygon(p) => Box::new(p.iter_contours().flat_map(|c| c.points.iter())),
            Geom::MultiPolygon(mp) => Box::new(
                mp.parts()
                    .iter()
                    .flat_map(|p| p.iter_contours())
                    .flat_map(|c| c.points.iter()),
            ),
        }
    }

    /// Projects the geometry with the given projection. Returns `None` if any of the points cannot be projected.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<Geom<Proj::OutPoint>>
    where
        Proj: Projection<InPoint = P> + ?Sized,
    {
        Some(match self {
            Geom::Point(p) => Geom::Point(projection.project(p)?),
            Geom::MultiPoint(points) => Geom::MultiPoint(
                points
                    .iter()
                    .map(|p| projection.project(p))
                    .collect::<Option<Vec<_>>>()?,
            ),
            Geom::Contour(c) => Geom::Contour(c.project_points(projection)?),
            Geom::MultiContour(parts) => Geom::MultiContour(
                parts
                    .iter()
                    .map(|c| c.project_points(projection))
                    .collect::<Option<Vec<_>>>()?,
            ),
            Geom::Polygon(p) => Geom::Polygon(p.project_points(projection)?),
            Geom::MultiPolygon(mp) => Geom::MultiPolygon(mp.project_points(projection)?),
        })
    }
}

impl<P: CartesianPoint2d<Num = f64>> Geom<P> {
    /// Returns true if the `point` hits the geometry.
    ///
    /// Points and lines are hit when the `point` is within `tolerance` of them. Polygons are hit when the point is
    /// inside them (holes excluded) or within `tolerance` of their outline.
    pub fn is_point_inside(&self, point: &impl CartesianPoint2d<Num = f64>, tolerance: f64) -> bool {
        let tolerance_sq = tolerance * tolerance;
        let near = |d: Option<f64>| d.is_some_and(|d| d <= tolerance_sq);
        match self {
            Geom::Point(p) => p.distance_sq(point) <= tolerance_sq,
            Geom::MultiPoint(points) => points.iter().any(|p| p.distance_sq(point) <= tolerance_sq),
            Geom::Contour(c) => near(c.distance_to_point_sq(point)),
            Geom::MultiContour(parts) => parts.iter().any(|c| near(c.distance_to_point_sq(point))),
            Geom::Polygon(p) => {
                p.contains_point(point) || near(p.distance_to_boundary_sq(point))
            }
            Geom::MultiPolygon(mp) => mp
                .parts()
                .iter()
                .any(|p| p.contains_point(point) || near(p.distance_to_boundary_sq(point))),
        }
    }

    /// Planar length of linear geometries. Zero for points and polygons.
    pub fn length(&self) -> f64 {
        match self {
            Geom::Contour(c) => c.length(),
            Geom::MultiContour(parts) => parts.iter().map(|c| c.length()).sum(),
            _ => 0.0,
        }
    }

    /// Planar area of polygonal geometries. Zero for points and lines.
    pub fn area(&self) -> f64 {
        match self {
            Geom::Polygon(p) => p.area(),
            Geom::MultiPolygon(mp) => mp.area(),
            _ => 0.0,
        }
    }

    /// Bounding rectangle of the geometry. `None` for empty geometries.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.iter_points())
    }
}

impl<P> From<P> for Geom<P> {
    fn from(value: P) -> Self {
        Self::Point(value)
    }
}

impl<P> From<Contour<P>> for Geom<P> {
    fn from(value: Contour<P>) -> Self {
        Self::Contour(value)
    }
}

impl<P> From<Polygon<P>> for Geom<P> {
    fn from(value: Polygon<P>) -> Self {
        Self::Polygon(value)
    }
}

impl<P> From<MultiPolygon<P>> for Geom<P> {
    fn from(value: MultiPolygon<P>) -> Self {
        Self::MultiPolygon(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;
    use crate::contour::ClosedContour;

    fn square() -> Geom<Point2d> {
        Polygon::from(ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(0.0, 10.0),
            Point2d::new(10.0, 10.0),
            Point2d::new(10.0, 0.0),
        ]))
        .into()
    }

    #[test]
    fn point_hit_uses_tolerance() {
        let geom: Geom<Point2d> = Point2d::new(1.0, 1.0).into();
        assert!(geom.is_point_inside(&Point2d::new(1.0, 3.0), 2.0));
        assert!(!geom.is_point_inside(&Point2d::new(1.0, 3.1), 2.0));
    }

    #[test]
    fn line_hit_uses_tolerance() {
        let geom: Geom<Point2d> =
            Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(10.0, 0.0)]).into();
        assert!(geom.is_point_inside(&Point2d::new(5.0, 1.0), 1.0));
        assert!(!geom.is_point_inside(&Point2d::new(5.0, 1.5), 1.0));
    }

    #[test]
    fn polygon_hit() {
        let geom = square();
        assert!(geom.is_point_inside(&Point2d::new(5.0, 5.0), 0.0));
        assert!(geom.is_point_inside(&Point2d::new(10.5, 5.0), 1.0));
        assert!(!geom.is_point_inside(&Point2d::new(12.0, 5.0), 1.0));
    }

    #[test]
    fn measures() {
        assert_eq!(square().area(), 100.0);
        assert_eq!(square().length(), 0.0);
        assert_eq!(square().geometry_type().name(), "Polygon");

        let rect = square().bounding_rect().unwrap();
        assert_eq!(rect.width(), 10.0);
    }
}
