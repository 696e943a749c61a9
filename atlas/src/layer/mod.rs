//! [Layers](Layer) are the sources of the data displayed on the map and of the features a user can click on.

use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

use atlas_types::cartesian::Point2d;
use maybe_sync::{MaybeSend, MaybeSync};
use serde::{Deserialize, Serialize};

use crate::feature::Feature;

pub mod feature_info;
mod vector_layer;
mod wms_layer;
mod wmts_layer;

pub use feature_info::{FeatureInfoProvider, FeatureInfoRequest};
pub use vector_layer::VectorLayer;
pub use wms_layer::WmsLayer;
pub use wmts_layer::WmtsLayer;

#[cfg(not(target_arch = "wasm32"))]
pub use feature_info::WmsFeatureInfoProvider;

/// What a layer is and how tools should treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Vector features rendered on the client. Features under a pixel are found locally.
    Vector,
    /// Image rendered by a remote server (WMS). Features under a pixel are requested from the server.
    RemoteRaster,
    /// Prerendered tiles without feature information.
    Tiles,
    /// Layer created by a tool to decorate the map: highlight overlay, drawings, print preview. Never queried for
    /// feature information.
    Overlay,
}

/// Presentation metadata of a layer used when building feature information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Human readable name of the layer.
    #[serde(default)]
    pub caption: Option<String>,
    /// Template of the feature information text, with `{attribute.path}` placeholders.
    #[serde(default)]
    pub information: Option<String>,
}

impl LayerInfo {
    /// Creates layer info with the given caption.
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: Some(caption.into()),
            information: None,
        }
    }

    /// Sets the information template.
    pub fn with_information(mut self, template: impl Into<String>) -> Self {
        self.information = Some(template.into());
        self
    }
}

/// A layer of the map.
///
/// Layers are shared between the map and the tools working with it, so all state that can change after the layer is
/// added to a map (visibility, features) uses interior mutability.
pub trait Layer: MaybeSend + MaybeSync {
    /// Unique name of the layer.
    fn name(&self) -> &str;
    /// Kind of the layer.
    fn kind(&self) -> LayerKind;
    /// Whether the layer is displayed.
    fn is_visible(&self) -> bool;
    /// Shows or hides the layer.
    fn set_visible(&self, visible: bool);
    /// Whether feature information can be requested from the layer.
    fn is_queryable(&self) -> bool {
        false
    }
    /// Presentation metadata of the layer.
    fn info(&self) -> Option<LayerInfo> {
        None
    }
    /// Features of the layer hit by the `point` (in map coordinates) with the given `tolerance` (in map units).
    fn features_at(&self, _point: &Point2d, _tolerance: f64) -> Vec<Feature> {
        Vec::new()
    }
    /// Remote feature information source of the layer.
    fn feature_info_provider(&self) -> Option<Arc<dyn FeatureInfoProvider>> {
        None
    }
    /// A map stores layers as trait objects. This method can be used to convert the trait object into the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared reference to a layer. Two references are equal if they point to the same layer instance.
#[derive(Clone)]
pub struct LayerRef(Arc<dyn Layer>);

impl LayerRef {
    /// Wraps the layer into a shared reference.
    pub fn new(layer: impl Layer + 'static) -> Self {
        Self(Arc::new(layer))
    }

    /// Wraps an already shared layer.
    pub fn from_arc(layer: Arc<dyn Layer>) -> Self {
        Self(layer)
    }

    /// Returns the referenced layer.
    pub fn layer(&self) -> &(dyn Layer + 'static) {
        &*self.0
    }

    /// Creates a weak reference to the layer.
    pub fn downgrade(&self) -> WeakLayerRef {
        WeakLayerRef(Arc::downgrade(&self.0))
    }

    /// Returns the layer as its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl std::ops::Deref for LayerRef {
    type Target = dyn Layer;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for LayerRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for LayerRef {}

impl Debug for LayerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LayerRef").field(&self.0.name()).finish()
    }
}

impl<T: Layer + 'static> From<Arc<T>> for LayerRef {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

/// Weak counterpart of [`LayerRef`]. Does not keep the layer alive.
#[derive(Clone)]
pub struct WeakLayerRef(Weak<dyn Layer>);

impl WeakLayerRef {
    /// Returns a strong reference if the layer still exists.
    pub fn upgrade(&self) -> Option<LayerRef> {
        self.0.upgrade().map(LayerRef)
    }
}

impl Debug for WeakLayerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(layer) => f.debug_tuple("WeakLayerRef").field(&layer.name()).finish(),
            None => f.write_str("WeakLayerRef(dropped)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_ref_identity() {
        let a = LayerRef::new(VectorLayer::new("a", vec![]));
        let b = LayerRef::new(VectorLayer::new("a", vec![]));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.downcast_ref::<VectorLayer>().is_some());
    }

    #[test]
    fn weak_ref_does_not_keep_layer_alive() {
        let layer = LayerRef::new(VectorLayer::new("a", vec![]));
        let weak = layer.downgrade();
        assert_eq!(weak.upgrade(), Some(layer.clone()));

        drop(layer);
        assert!(weak.upgrade().is_none());
    }
}
