//! Geographic coordinates (latitude and longitude, see [`GeoPoint`]) and conversion between coordinate
//! systems (see [`Projection`]).

mod crs;
mod point;
mod projection;

pub use crs::{Crs, ProjectionType};
pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
pub use projection::{
    ChainProjection, GeographicProjection, IdentityProjection, InvertedProjection, Projection,
    WebMercator,
};

#[cfg(feature = "geodesy")]
pub use projection::GeodesyProjection;
