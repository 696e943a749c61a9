use atlas_types::cartesian::Point2d;
use atlas_types::Geom;
use serde_json::{Map, Value};

/// Geographic object with attributes, as produced by a layer.
///
/// Geometry is always in the coordinates of the map the layer belongs to. Features reported by remote services may
/// come without geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Option<Geom<Point2d>>,
    attributes: Map<String, Value>,
}

impl Feature {
    /// Creates a feature without attributes.
    pub fn new(geometry: impl Into<Geom<Point2d>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            attributes: Map::new(),
        }
    }

    /// Creates a feature that has only attributes.
    pub fn without_geometry(attributes: Map<String, Value>) -> Self {
        Self {
            geometry: None,
            attributes,
        }
    }

    /// Creates a feature with the given attributes.
    pub fn with_attributes(
        geometry: impl Into<Geom<Point2d>>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            geometry: Some(geometry.into()),
            attributes,
        }
    }

    /// Adds an attribute to the feature.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Geometry of the feature.
    pub fn geometry(&self) -> Option<&Geom<Point2d>> {
        self.geometry.as_ref()
    }

    /// All attributes of the feature.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Value of a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Value of a string attribute. Returns `None` if the attribute is missing or is not a string.
    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}
