//! Feature information requests to remote map services.

use async_trait::async_trait;
use atlas_types::cartesian::Point2d;
use atlas_types::geo::Crs;
use atlas_types::{ClosedContour, Contour, Geom, MultiPolygon, Polygon};
use geojson::GeoJson;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::error::AtlasError;
use crate::feature::Feature;

/// Parameters of a feature information request: the clicked point and the state of the map view.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoRequest {
    /// Clicked point in map coordinates.
    pub coordinate: Point2d,
    /// Map units per pixel of the current view.
    pub resolution: f64,
    /// Coordinate system of the map.
    pub crs: Crs,
}

/// Source of the features located at a point of a remote layer.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FeatureInfoProvider: MaybeSend + MaybeSync {
    /// Requests the features at the point. Features are returned in the coordinates of the request CRS.
    async fn feature_info(&self, request: &FeatureInfoRequest) -> Result<Vec<Feature>, AtlasError>;
}

/// Decodes a GeoJSON document (a feature collection, a single feature or a bare geometry) into features.
pub fn features_from_geojson(document: &str) -> Result<Vec<Feature>, AtlasError> {
    let geojson: GeoJson = document
        .parse()
        .map_err(|err: geojson::Error| AtlasError::Decoding(err.to_string()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(convert_feature)
            .collect::<Result<Vec<_>, _>>()?,
        GeoJson::Feature(feature) => vec![convert_feature(feature)?],
        GeoJson::Geometry(geometry) => vec![Feature::new(convert_geometry(&geometry.value)?)],
    };

    Ok(features)
}

fn convert_feature(feature: geojson::Feature) -> Result<Feature, AtlasError> {
    let attributes = feature.properties.unwrap_or_default();
    match feature.geometry {
        Some(geometry) => Ok(Feature::with_attributes(
            convert_geometry(&geometry.value)?,
            attributes,
        )),
        None => Ok(Feature::without_geometry(attributes)),
    }
}

fn convert_geometry(value: &geojson::Value) -> Result<Geom<Point2d>, AtlasError> {
    use geojson::Value;

    Ok(match value {
        Value::Point(position) => Geom::Point(point(position)?),
        Value::MultiPoint(positions) => Geom::MultiPoint(points(positions)?),
        Value::LineString(positions) => Geom::Contour(Contour::open(points(positions)?)),
        Value::MultiLineString(lines) => Geom::MultiContour(
            lines
                .iter()
                .map(|line| Ok::<_, AtlasError>(Contour::open(points(line)?)))
                .collect::<Result<_, AtlasError>>()?,
        ),
        Value::Polygon(rings) => Geom::Polygon(polygon(rings)?),
        Value::MultiPolygon(polygons) => Geom::MultiPolygon(MultiPolygon::from(
            polygons
                .iter()
                .map(|rings| polygon(rings))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Value::GeometryCollection(_) => {
            return Err(AtlasError::Decoding(
                "geometry collections are not supported".into(),
            ))
        }
    })
}

fn point(position: &[f64]) -> Result<Point2d, AtlasError> {
    match position {
        [x, y, ..] => Ok(Point2d::new(*x, *y)),
        _ => Err(AtlasError::Decoding(format!(
            "position must have at least 2 coordinates, got {}",
            position.len()
        ))),
    }
}

fn points(positions: &[Vec<f64>]) -> Result<Vec<Point2d>, AtlasError> {
    positions.iter().map(|p| point(p)).collect()
}

fn polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<Point2d>, AtlasError> {
    let mut rings = rings
        .iter()
        .map(|ring| Ok::<_, AtlasError>(ClosedContour::from_ring(points(ring)?)));
    let outer = rings
        .next()
        .ok_or_else(|| AtlasError::Decoding("polygon without rings".into()))??;
    Ok(Polygon::new(outer, rings.collect::<Result<_, AtlasError>>()?))
}

#[cfg(not(target_arch = "wasm32"))]
mod wms {
    use async_trait::async_trait;
    use atlas_types::cartesian::Rect;
    use atlas_types::geo::Crs;

    use super::{features_from_geojson, FeatureInfoProvider, FeatureInfoRequest};
    use crate::error::AtlasError;
    use crate::feature::Feature;
    use crate::platform::{PlatformService, PlatformServiceImpl};

    /// Size of the virtual image the request is made for, in pixels. The clicked point is in its center.
    const QUERY_SIZE: u32 = 101;

    /// Requests features from a WMS server with `GetFeatureInfo` (WMS 1.3.0) and decodes GeoJSON responses.
    pub struct WmsFeatureInfoProvider {
        url: String,
        layers: Vec<String>,
        info_format: String,
        feature_count: u32,
        platform_service: PlatformServiceImpl,
    }

    impl WmsFeatureInfoProvider {
        /// Creates a provider querying the given layers of the service at `url`.
        pub fn new(url: impl Into<String>, layers: Vec<String>) -> Self {
            Self {
                url: url.into(),
                layers,
                info_format: "application/json".into(),
                feature_count: 1,
                platform_service: PlatformServiceImpl::new(),
            }
        }

        /// Sets maximum number of features the server should return.
        pub fn with_feature_count(mut self, count: u32) -> Self {
            self.feature_count = count;
            self
        }

        /// Builds the `GetFeatureInfo` url for the request.
        pub fn get_feature_info_url(
            &self,
            request: &FeatureInfoRequest,
        ) -> Result<reqwest::Url, AtlasError> {
            let half_size = QUERY_SIZE as f64 / 2.0 * request.resolution;
            let bbox = Rect::from_center(&request.coordinate, half_size, half_size);
            let bbox = if request.crs == Crs::WGS84 {
                // WMS 1.3.0 uses lat/lon axis order for EPSG:4326
                format!(
                    "{},{},{},{}",
                    bbox.y_min(),
                    bbox.x_min(),
                    bbox.y_max(),
                    bbox.x_max()
                )
            } else {
                format!(
                    "{},{},{},{}",
                    bbox.x_min(),
                    bbox.y_min(),
                    bbox.x_max(),
                    bbox.y_max()
                )
            };

            let layers = self.layers.join(",");
            let size = QUERY_SIZE.to_string();
            let pixel = (QUERY_SIZE / 2).to_string();
            let feature_count = self.feature_count.to_string();

            reqwest::Url::parse_with_params(
                &self.url,
                &[
                    ("SERVICE", "WMS"),
                    ("VERSION", "1.3.0"),
                    ("REQUEST", "GetFeatureInfo"),
                    ("FORMAT", "image/png"),
                    ("TRANSPARENT", "true"),
                    ("LAYERS", &layers),
                    ("QUERY_LAYERS", &layers),
                    ("INFO_FORMAT", &self.info_format),
                    ("FEATURE_COUNT", &feature_count),
                    ("CRS", request.crs.code()),
                    ("BBOX", &bbox),
                    ("WIDTH", &size),
                    ("HEIGHT", &size),
                    ("I", &pixel),
                    ("J", &pixel),
                ],
            )
            .map_err(|err| AtlasError::Configuration(format!("invalid WMS url: {err}")))
        }
    }

    #[async_trait]
    impl FeatureInfoProvider for WmsFeatureInfoProvider {
        async fn feature_info(
            &self,
            request: &FeatureInfoRequest,
        ) -> Result<Vec<Feature>, AtlasError> {
            let url = self.get_feature_info_url(request)?;
            let body = self.platform_service.get_text(url.as_str()).await?;
            features_from_geojson(&body)
        }
    }

    #[cfg(test)]
    mod tests {
        use atlas_types::cartesian::Point2d;

        use super::*;

        #[test]
        fn get_feature_info_url() {
            let provider = WmsFeatureInfoProvider::new(
                "https://maps.example.com/wms?map=city",
                vec!["parcels".into(), "roads".into()],
            );
            let url = provider
                .get_feature_info_url(&FeatureInfoRequest {
                    coordinate: Point2d::new(1000.0, 2000.0),
                    resolution: 2.0,
                    crs: Crs::EPSG3857,
                })
                .unwrap();

            let params: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            let get = |name: &str| {
                params
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.as_str())
            };

            assert_eq!(get("map"), Some("city"));
            assert_eq!(get("QUERY_LAYERS"), Some("parcels,roads"));
            assert_eq!(get("CRS"), Some("EPSG:3857"));
            assert_eq!(get("BBOX"), Some("899,1899,1101,2101"));
            assert_eq!(get("I"), Some("50"));
            assert_eq!(get("WIDTH"), Some("101"));
        }

        #[test]
        fn geographic_bbox_is_lat_lon() {
            let provider = WmsFeatureInfoProvider::new("https://maps.example.com/wms", vec![]);
            let url = provider
                .get_feature_info_url(&FeatureInfoRequest {
                    coordinate: Point2d::new(18.0, 59.0),
                    resolution: 0.02,
                    crs: Crs::WGS84,
                })
                .unwrap();
            let bbox = url
                .query_pairs()
                .find(|(k, _)| k == "BBOX")
                .map(|(_, v)| v.into_owned())
                .unwrap();
            let min_lat: f64 = bbox.split(',').next().unwrap().parse().unwrap();
            approx::assert_relative_eq!(min_lat, 57.99, epsilon = 1e-9);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use wms::WmsFeatureInfoProvider;
