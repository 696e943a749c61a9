use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::cartesian::{NewCartesianPoint2d, Point2d};
use crate::error::AtlasTypesError;
use crate::geo::point::{GeoPoint2d, NewGeoPoint};
use crate::geo::projection::{
    ChainProjection, GeographicProjection, IdentityProjection, InvertedProjection, Projection,
    WebMercator,
};

/// Coordinate reference system.
///
/// Identified by its code (e.g. `EPSG:3857`). Only the code takes part in equality comparison.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Crs {
    code: Cow<'static, str>,
    projection_type: ProjectionType,
}

/// Method used to project geographic coordinates into the CRS plane.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub enum ProjectionType {
    /// Geographic coordinates are used as is: `x` is longitude and `y` is latitude in degrees.
    None,
    /// Spherical mercator.
    WebMercator,
    /// Projection given by a `geodesy` operator definition, e.g. `utm zone=33`.
    Other(String),
}

impl Crs {
    /// WGS84 geographic coordinates (`EPSG:4326`).
    pub const WGS84: Crs = Crs {
        code: Cow::Borrowed("EPSG:4326"),
        projection_type: ProjectionType::None,
    };

    /// Web Mercator (`EPSG:3857`), the projection of most web map tiles.
    pub const EPSG3857: Crs = Crs {
        code: Cow::Borrowed("EPSG:3857"),
        projection_type: ProjectionType::WebMercator,
    };

    /// Creates a new CRS.
    pub fn new(code: impl Into<String>, projection_type: ProjectionType) -> Self {
        Self {
            code: Cow::Owned(code.into()),
            projection_type,
        }
    }

    /// Resolves one of the well known codes. Both `EPSG:3857` and `3857` notations are accepted.
    pub fn from_code(code: &str) -> Result<Self, AtlasTypesError> {
        let normalized = code.trim().to_ascii_uppercase();
        let srid = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        match srid {
            "4326" => Ok(Self::WGS84),
            "3857" | "900913" => Ok(Self::EPSG3857),
            _ => Err(AtlasTypesError::UnknownCrs(code.to_string())),
        }
    }

    /// Code of the CRS.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Numeric id of the CRS, if the code is in `AUTHORITY:ID` form.
    pub fn srid(&self) -> Option<u32> {
        self.code.rsplit(':').next()?.parse().ok()
    }

    /// Projection type of the CRS.
    pub fn projection_type(&self) -> &ProjectionType {
        &self.projection_type
    }

    /// Returns a projection from geographic coordinates into this CRS.
    pub fn get_projection<In, Out>(
        &self,
    ) -> Option<Box<dyn Projection<InPoint = In, OutPoint = Out>>>
    where
        In: NewGeoPoint + 'static,
        Out: NewCartesianPoint2d + 'static,
    {
        match &self.projection_type {
            ProjectionType::None => Some(Box::new(GeographicProjection::new())),
            ProjectionType::WebMercator => Some(Box::new(WebMercator::new())),
            #[cfg(feature = "geodesy")]
            ProjectionType::Other(definition) => Some(Box::new(
                crate::geo::GeodesyProjection::new(definition)?,
            )),
            #[cfg(not(feature = "geodesy"))]
            ProjectionType::Other(_) => None,
        }
    }

    /// Returns a projection converting points in this CRS into points in the `target` CRS.
    pub fn transformation_to(
        &self,
        target: &Crs,
    ) -> Option<Box<dyn Projection<InPoint = Point2d, OutPoint = Point2d>>> {
        if self == target {
            return Some(Box::new(IdentityProjection::new()));
        }

        let source = self.get_projection::<GeoPoint2d, Point2d>()?;
        let target = target.get_projection::<GeoPoint2d, Point2d>()?;
        Some(Box::new(ChainProjection::new(
            Box::new(InvertedProjection::new(source)),
            target,
        )))
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.code.eq_ignore_ascii_case(&other.code)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cartesian::CartesianPoint2d;

    #[test]
    fn from_code() {
        assert_eq!(Crs::from_code("EPSG:3857").unwrap(), Crs::EPSG3857);
        assert_eq!(Crs::from_code("epsg:4326").unwrap(), Crs::WGS84);
        assert_eq!(Crs::from_code("3857").unwrap(), Crs::EPSG3857);
        assert!(Crs::from_code("EPSG:3006").is_err());
    }

    #[test]
    fn srid() {
        assert_eq!(Crs::EPSG3857.srid(), Some(3857));
        assert_eq!(Crs::new("local", ProjectionType::None).srid(), None);
    }

    #[test]
    fn transformation_round_trip() {
        let to_wgs84 = Crs::EPSG3857.transformation_to(&Crs::WGS84).unwrap();
        let point = Point2d::new(2_010_000.0, 8_250_000.0);
        let geo = to_wgs84.project(&point).unwrap();
        assert!(geo.x() > 18.0 && geo.x() < 18.1);
        assert!(geo.y() > 59.0 && geo.y() < 60.0);

        let back = to_wgs84.unproject(&geo).unwrap();
        assert_relative_eq!(back.x(), point.x(), epsilon = 1e-6);
        assert_relative_eq!(back.y(), point.y(), epsilon = 1e-6);
    }

    #[test]
    fn identity_for_same_crs() {
        let projection = Crs::WGS84.transformation_to(&Crs::WGS84).unwrap();
        let point = Point2d::new(18.0, 59.0);
        assert_eq!(projection.project(&point), Some(point));
    }
}
