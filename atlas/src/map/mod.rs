use atlas_types::cartesian::CartesianPoint2d;

use crate::feature::Feature;
use crate::layer::LayerRef;
use crate::view::MapView;

mod layer_collection;

pub use layer_collection::LayerCollection;

/// Map specifies a set of layers, and the view they are displayed with.
#[derive(Debug, Clone, Default)]
pub struct Map {
    view: MapView,
    layers: LayerCollection,
}

impl Map {
    /// Creates a new map.
    pub fn new(view: MapView, layers: impl Into<LayerCollection>) -> Self {
        Self {
            view,
            layers: layers.into(),
        }
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Changes the view of the map to the given one.
    pub fn set_view(&mut self, view: MapView) {
        self.view = view;
    }

    /// Returns the list of map's layers.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Returns a mutable reference to the list of map's layers.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// Features displayed at the given pixel of the viewport, together with the layers they belong to.
    ///
    /// Only visible layers are checked. Hits are ordered from the topmost layer down. `tolerance_px` is the hit
    /// radius in pixels.
    pub fn features_at_pixel(
        &self,
        pixel: impl CartesianPoint2d<Num = f64>,
        tolerance_px: f64,
    ) -> Vec<(Feature, LayerRef)> {
        let point = self.view.screen_to_map(pixel);
        let tolerance = tolerance_px * self.view.resolution();

        self.layers
            .iter_visible()
            .rev()
            .flat_map(|layer| {
                layer
                    .features_at(&point, tolerance)
                    .into_iter()
                    .map(move |feature| (feature, layer.clone()))
            })
            .collect()
    }
}
