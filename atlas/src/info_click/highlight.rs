//! Highlighting of the selected feature-info result.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use atlas_types::cartesian::Point2d;
use atlas_types::GeometryType;
use parking_lot::{Mutex, RwLock};

use super::results::FeatureInfoResult;
use crate::feature::Feature;
use crate::layer::{Layer, LayerKind, LayerRef, WeakLayerRef};
use crate::map::LayerCollection;

/// Name of the highlight overlay layer.
pub const HIGHLIGHT_LAYER_NAME: &str = "highlight-layer";

/// Icon used to decorate a selected point feature.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    /// Image url.
    pub src: String,
    /// Anchor of the image: horizontal as a fraction of the width, vertical in pixels.
    pub anchor: [f64; 2],
    /// Image size in pixels.
    pub size: [f64; 2],
}

impl MarkerIcon {
    /// Creates a 32x32 marker anchored at the middle of its bottom edge.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            anchor: [0.5, 32.0],
            size: [32.0, 32.0],
        }
    }
}

/// Overlay layer holding at most one highlighted feature.
///
/// The overlay is visible only while the layer that produced the highlighted feature is visible. The owner's visibility
/// is read every time, so changes made to it after the selection are reflected without any bookkeeping.
pub struct HighlightLayer {
    feature: RwLock<Option<Feature>>,
    owner: RwLock<Option<WeakLayerRef>>,
    visible: AtomicBool,
}

impl HighlightLayer {
    fn new() -> Self {
        Self {
            feature: RwLock::new(None),
            owner: RwLock::new(None),
            visible: AtomicBool::new(true),
        }
    }

    /// The highlighted feature.
    pub fn feature(&self) -> Option<Feature> {
        self.feature.read().clone()
    }

    /// Layer the highlighted feature belongs to.
    pub fn owner(&self) -> Option<LayerRef> {
        self.owner.read().as_ref().and_then(WeakLayerRef::upgrade)
    }

    fn set(&self, feature: Feature, owner: &LayerRef) {
        *self.feature.write() = Some(feature);
        *self.owner.write() = Some(owner.downgrade());
    }

    fn clear(&self) {
        *self.feature.write() = None;
        *self.owner.write() = None;
    }
}

impl Layer for HighlightLayer {
    fn name(&self) -> &str {
        HIGHLIGHT_LAYER_NAME
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Overlay
    }

    fn is_visible(&self) -> bool {
        if !self.visible.load(Ordering::Relaxed) {
            return false;
        }

        match &*self.owner.read() {
            Some(owner) => owner.upgrade().is_some_and(|layer| layer.is_visible()),
            None => true,
        }
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    fn features_at(&self, point: &Point2d, tolerance: f64) -> Vec<Feature> {
        self.feature
            .read()
            .iter()
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

/// Keeps the highlight of the selected result in sync with the selection.
///
/// Lines and polygons are highlighted by copying them into the [`HighlightLayer`] drawn right above the layer they
/// came from. Points are decorated with a marker icon instead.
pub struct HighlightManager {
    overlay: Arc<HighlightLayer>,
    point_selection: Mutex<Option<Feature>>,
    marker: MarkerIcon,
}

impl HighlightManager {
    /// Creates a manager that decorates selected points with the given marker.
    pub fn new(marker: MarkerIcon) -> Self {
        Self {
            overlay: Arc::new(HighlightLayer::new()),
            point_selection: Mutex::new(None),
            marker,
        }
    }

    /// The overlay layer.
    pub fn overlay(&self) -> &Arc<HighlightLayer> {
        &self.overlay
    }

    /// Reference to the overlay layer as stored in a layer collection.
    pub fn overlay_ref(&self) -> LayerRef {
        LayerRef::from(self.overlay.clone())
    }

    /// Selected point feature, if the selection is a point.
    pub fn point_selection(&self) -> Option<Feature> {
        self.point_selection.lock().clone()
    }

    /// Marker used for selected points.
    pub fn marker(&self) -> &MarkerIcon {
        &self.marker
    }

    /// Highlights the given result, or removes any highlight if `None` is given.
    pub fn select(&self, result: Option<&FeatureInfoResult>, layers: &mut LayerCollection) {
        *self.point_selection.lock() = None;

        let Some(result) = result else {
            self.overlay.clear();
            return;
        };

        let is_point = result
            .feature
            .geometry()
            .is_some_and(|g| g.geometry_type() == GeometryType::Point);

        self.overlay.clear();
        if is_point {
            *self.point_selection.lock() = Some(result.feature.clone());
        } else {
            self.reorder(result, layers);
            self.overlay.set(result.feature.clone(), &result.layer);
        }
    }

    /// Moves the overlay right above the layer of the result. If that layer is not in the collection, the overlay is
    /// placed on top of all layers.
    pub fn reorder(&self, result: &FeatureInfoResult, layers: &mut LayerCollection) {
        let overlay = self.overlay_ref();
        layers.remove_ref(&overlay);

        match layers.position(&result.layer) {
            Some(index) => layers.insert(index + 1, overlay),
            None => layers.push_ref(overlay),
        }
    }

    /// Removes the highlight. Calling it with nothing highlighted does nothing.
    pub fn clear(&self) {
        *self.point_selection.lock() = None;
        self.overlay.clear();
    }

    /// Returns true if anything is highlighted.
    pub fn is_empty(&self) -> bool {
        self.point_selection.lock().is_none() && self.overlay.feature.read().is_none()
    }
}

impl std::fmt::Debug for HighlightManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightManager")
            .field("feature", &self.overlay.feature())
            .field("point_selection", &self.point_selection())
            .field("marker", &self.marker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use atlas_types::{ClosedContour, Polygon};

    use super::*;
    use crate::info_click::results::{FeatureInfo, Information, SourceGroup, SourceOrder};
    use crate::layer::VectorLayer;

    fn square() -> Feature {
        Feature::new(Polygon::from(ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
            Point2d::new(0.0, 10.0),
        ])))
    }

    fn result(feature: Feature, layer: &LayerRef) -> FeatureInfoResult {
        FeatureInfoResult {
            feature,
            layer: layer.clone(),
            information: FeatureInfo {
                caption: "Parcels".into(),
                layer_index: 0,
                information: Information::Text(String::new()),
                icon_url: String::new(),
            },
            source_order: SourceOrder {
                group: SourceGroup::Local,
                rank: 0,
            },
        }
    }

    fn names(layers: &LayerCollection) -> Vec<String> {
        layers.iter().map(|l| l.name().to_string()).collect()
    }

    #[test]
    fn overlay_is_placed_above_owner() {
        let mut layers = LayerCollection::default();
        let parcels = layers.push(VectorLayer::new("parcels", vec![]));
        let roads = layers.push(VectorLayer::new("roads", vec![]));
        layers.push(VectorLayer::new("labels", vec![]));

        let manager = HighlightManager::new(MarkerIcon::new("marker.png"));
        manager.select(Some(&result(square(), &parcels)), &mut layers);
        assert_eq!(
            names(&layers),
            vec!["parcels", HIGHLIGHT_LAYER_NAME, "roads", "labels"]
        );

        manager.select(Some(&result(square(), &roads)), &mut layers);
        assert_eq!(
            names(&layers),
            vec!["parcels", "roads", HIGHLIGHT_LAYER_NAME, "labels"]
        );
        assert_eq!(manager.overlay().owner(), Some(roads));
        assert_eq!(manager.overlay().feature(), Some(square()));
    }

    #[test]
    fn overlay_visibility_follows_owner() {
        let mut layers = LayerCollection::default();
        let parcels = layers.push(VectorLayer::new("parcels", vec![]));

        let manager = HighlightManager::new(MarkerIcon::new("marker.png"));
        manager.select(Some(&result(square(), &parcels)), &mut layers);
        assert!(manager.overlay().is_visible());

        parcels.set_visible(false);
        assert!(!manager.overlay().is_visible());

        parcels.set_visible(true);
        assert!(manager.overlay().is_visible());
    }

    #[test]
    fn point_uses_marker() {
        let mut layers = LayerCollection::default();
        let poi = layers.push(VectorLayer::new("poi", vec![]));

        let manager = HighlightManager::new(MarkerIcon::new("marker.png"));
        manager.select(Some(&result(square(), &poi)), &mut layers);

        let point = Feature::new(Point2d::new(1.0, 1.0));
        manager.select(Some(&result(point.clone(), &poi)), &mut layers);

        assert_eq!(manager.point_selection(), Some(point));
        assert!(manager.overlay().feature().is_none());
        assert_eq!(manager.marker().anchor, [0.5, 32.0]);
    }

    #[test]
    fn select_none_clears() {
        let mut layers = LayerCollection::default();
        let parcels = layers.push(VectorLayer::new("parcels", vec![]));

        let manager = HighlightManager::new(MarkerIcon::new("marker.png"));
        manager.select(Some(&result(square(), &parcels)), &mut layers);
        assert!(!manager.is_empty());

        manager.select(None, &mut layers);
        assert!(manager.is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let manager = HighlightManager::new(MarkerIcon::new("marker.png"));
        manager.clear();
        assert!(manager.is_empty());
        assert!(manager.overlay().owner().is_none());

        manager.clear();
        assert!(manager.is_empty());
        assert!(manager.overlay().is_visible());
    }
}
