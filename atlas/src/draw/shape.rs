use atlas_types::cartesian::Point2d;
use atlas_types::geo::Projection;
use atlas_types::{Geom, GeometryType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::style::StyleAttributes;
use crate::feature::Feature;

/// Kind of a drawn shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Point marker.
    Point,
    /// Line.
    LineString,
    /// Polygon, possibly with holes or consisting of several parts.
    Polygon,
    /// Text label anchored at a point.
    Text,
}

impl ShapeKind {
    /// Name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Point => "Point",
            ShapeKind::LineString => "LineString",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Text => "Text",
        }
    }

    /// Kind of a shape with the given geometry. Text shapes cannot be recognized by their geometry.
    pub fn from_geometry(geometry: &Geom<Point2d>) -> Option<Self> {
        match geometry.geometry_type() {
            GeometryType::Point => Some(ShapeKind::Point),
            GeometryType::LineString => Some(ShapeKind::LineString),
            GeometryType::Polygon | GeometryType::MultiPolygon => Some(ShapeKind::Polygon),
            GeometryType::MultiPoint | GeometryType::MultiLineString => None,
        }
    }
}

/// Projected position of a point, rounded to whole map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Northing.
    pub north: f64,
    /// Easting.
    pub east: f64,
}

/// Descriptive properties of a drawn shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeProperties {
    /// Explicit name.
    pub name: Option<String>,
    /// Explicit description. Holds the text of text shapes.
    pub description: Option<String>,
    /// Rounded length of a line.
    pub length: Option<f64>,
    /// Rounded area of a polygon.
    pub area: Option<f64>,
    /// Rounded position of a point.
    pub position: Option<Position>,
    /// Any other attributes.
    pub attributes: Map<String, Value>,
}

/// Shape drawn by the user or imported from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    /// Kind of the shape.
    pub kind: ShapeKind,
    /// Geometry in map coordinates.
    pub geometry: Geom<Point2d>,
    /// Style of the shape.
    pub style: StyleAttributes,
    /// Properties of the shape.
    pub properties: ShapeProperties,
}

impl DrawnShape {
    /// Creates a shape with default style. Returns `None` if the geometry type cannot be drawn.
    pub fn new(geometry: impl Into<Geom<Point2d>>) -> Option<Self> {
        let geometry = geometry.into();
        let mut shape = Self {
            kind: ShapeKind::from_geometry(&geometry)?,
            geometry,
            style: StyleAttributes::default(),
            properties: ShapeProperties::default(),
        };
        shape.update_from_geometry();

        Some(shape)
    }

    /// Creates a text shape at the point.
    pub fn text(position: Point2d, text: impl Into<String>) -> Self {
        let mut shape = Self {
            kind: ShapeKind::Text,
            geometry: Geom::Point(position),
            style: StyleAttributes::default(),
            properties: ShapeProperties::default(),
        };
        shape.update_from_text(text);

        shape
    }

    /// Sets the kind of the shape and its measurements from the geometry.
    pub fn update_from_geometry(&mut self) {
        if let Some(kind) = ShapeKind::from_geometry(&self.geometry) {
            self.kind = kind;
        }

        let properties = &mut self.properties;
        properties.position = None;
        properties.length = None;
        properties.area = None;

        match &self.geometry {
            Geom::Point(point) => {
                properties.position = Some(Position {
                    north: point.y.round(),
                    east: point.x.round(),
                })
            }
            Geom::Contour(_) => properties.length = Some(self.geometry.length().round()),
            Geom::Polygon(_) | Geom::MultiPolygon(_) => {
                properties.area = Some(self.geometry.area().round())
            }
            _ => {}
        }
    }

    /// Turns the shape into a text shape with the given text.
    pub fn update_from_text(&mut self, text: impl Into<String>) {
        self.kind = ShapeKind::Text;
        self.properties.description = Some(text.into());
    }

    /// Label shown next to the shape. Measurements are shown only if `show_labels` is set, text shapes always show
    /// their text.
    pub fn label_text(&self, show_labels: bool) -> String {
        let properties = &self.properties;
        match self.kind {
            ShapeKind::Text => properties.description.clone().unwrap_or_default(),
            _ if !show_labels => String::new(),
            ShapeKind::Point => properties
                .position
                .map(|p| format!("North: {} East: {}", p.north, p.east))
                .unwrap_or_default(),
            ShapeKind::LineString => properties
                .length
                .map(|length| format!("{length} m"))
                .unwrap_or_default(),
            ShapeKind::Polygon => properties
                .area
                .map(|area| format!("{area} m²"))
                .unwrap_or_default(),
        }
    }

    /// Returns a copy of the shape with the geometry projected. Properties are kept as they are.
    pub fn project(
        &self,
        projection: &(impl Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized),
    ) -> Option<Self> {
        Some(Self {
            geometry: self.geometry.project(projection)?,
            ..self.clone()
        })
    }

    /// Converts the shape into a feature with the shape properties as attributes.
    pub fn to_feature(&self) -> Feature {
        let properties = &self.properties;
        let mut feature = Feature::with_attributes(self.geometry.clone(), properties.attributes.clone())
            .with_attribute("type", self.kind.name())
            .with_attribute("user", true);

        if let Some(name) = &properties.name {
            feature = feature.with_attribute("name", name.as_str());
        }
        if let Some(description) = &properties.description {
            feature = feature.with_attribute("description", description.as_str());
        }
        if let Some(length) = properties.length {
            feature = feature.with_attribute("length", length);
        }
        if let Some(area) = properties.area {
            feature = feature.with_attribute("area", area);
        }
        if let Some(position) = properties.position {
            feature = feature.with_attribute(
                "position",
                serde_json::json!({"n": position.north, "e": position.east}),
            );
        }

        feature
    }
}

#[cfg(test)]
mod tests {
    use atlas_types::{ClosedContour, Contour, Polygon};

    use super::*;

    #[test]
    fn measurements() {
        let point = DrawnShape::new(Point2d::new(319_500.4, 6_398_000.6)).unwrap();
        assert_eq!(point.kind, ShapeKind::Point);
        assert_eq!(
            point.properties.position,
            Some(Position {
                north: 6_398_001.0,
                east: 319_500.0
            })
        );
        assert_eq!(point.label_text(false), "");
        assert_eq!(point.label_text(true), "North: 6398001 East: 319500");

        let line = DrawnShape::new(Contour::open(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(3.0, 4.0),
            Point2d::new(3.0, 14.4),
        ]))
        .unwrap();
        assert_eq!(line.properties.length, Some(15.0));
        assert_eq!(line.label_text(true), "15 m");

        let polygon = DrawnShape::new(Polygon::from(ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 12.0),
            Point2d::new(0.0, 12.0),
        ])))
        .unwrap();
        assert_eq!(polygon.properties.area, Some(120.0));
        assert_eq!(polygon.properties.length, None);
        assert_eq!(polygon.label_text(true), "120 m²");
    }

    #[test]
    fn text_label_is_always_shown() {
        let text = DrawnShape::text(Point2d::new(1.0, 2.0), "Harbour");
        assert_eq!(text.kind, ShapeKind::Text);
        assert_eq!(text.label_text(false), "Harbour");
        assert_eq!(text.label_text(true), "Harbour");
    }

    #[test]
    fn multi_points_cannot_be_drawn() {
        let geometry: Geom<Point2d> = Geom::MultiPoint(vec![Point2d::new(0.0, 0.0)]);
        assert!(DrawnShape::new(geometry).is_none());
    }

    #[test]
    fn feature_attributes() {
        let shape = DrawnShape::text(Point2d::new(1.0, 2.0), "Harbour");
        let feature = shape.to_feature();
        assert_eq!(feature.str_attribute("type"), Some("Text"));
        assert_eq!(feature.str_attribute("description"), Some("Harbour"));
        assert_eq!(feature.attribute("user"), Some(&Value::Bool(true)));
    }
}
