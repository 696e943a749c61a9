use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

use atlas_types::cartesian::Point2d;
use parking_lot::RwLock;

use crate::feature::Feature;
use crate::layer::{Layer, LayerInfo, LayerKind};

/// Layer with a set of features rendered on the client.
///
/// Features added later are drawn on top of the earlier ones, so hit testing reports them first.
pub struct VectorLayer {
    name: String,
    features: RwLock<Vec<Feature>>,
    visible: AtomicBool,
    queryable: bool,
    info: Option<LayerInfo>,
}

impl VectorLayer {
    /// Creates a new visible and queryable layer.
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features: RwLock::new(features),
            visible: AtomicBool::new(true),
            queryable: true,
            info: None,
        }
    }

    /// Sets the presentation metadata of the layer.
    pub fn with_info(mut self, info: LayerInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Sets whether feature information is reported for the layer.
    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    /// Sets initial visibility of the layer.
    pub fn with_visible(self, visible: bool) -> Self {
        self.visible.store(visible, Ordering::Relaxed);
        self
    }

    /// Adds a feature on top of the existing ones.
    pub fn push(&self, feature: Feature) {
        self.features.write().push(feature);
    }

    /// Removes all features.
    pub fn clear(&self) {
        self.features.write().clear();
    }

    /// Copies of all features of the layer.
    pub fn features(&self) -> Vec<Feature> {
        self.features.read().clone()
    }
}

impl Layer for VectorLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Vector
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    fn is_queryable(&self) -> bool {
        self.queryable
    }

    fn info(&self) -> Option<LayerInfo> {
        self.info.clone()
    }

    fn features_at(&self, point: &Point2d, tolerance: f64) -> Vec<Feature> {
        self.features
            .read()
            .iter()
            .rev()
            .filter(|f| {
                f.geometry()
                    .is_some_and(|g| g.is_point_inside(point, tolerance))
            })
            .cloned()
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
