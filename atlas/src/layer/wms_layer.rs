use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::layer::feature_info::FeatureInfoProvider;
use crate::layer::{Layer, LayerInfo, LayerKind};

/// Image layer rendered by a WMS server.
///
/// Features of the layer are not known to the client: clicks are resolved with the layer's
/// [`FeatureInfoProvider`].
pub struct WmsLayer {
    name: String,
    url: String,
    layers: Vec<String>,
    visible: AtomicBool,
    queryable: bool,
    info: Option<LayerInfo>,
    provider: Option<Arc<dyn FeatureInfoProvider>>,
}

impl WmsLayer {
    /// Creates a layer showing `layers` of the WMS service at `url`.
    ///
    /// On native platforms the layer is queryable through [`WmsFeatureInfoProvider`](super::WmsFeatureInfoProvider)
    /// by default.
    pub fn new(name: impl Into<String>, url: impl Into<String>, layers: Vec<String>) -> Self {
        let url = url.into();

        #[cfg(not(target_arch = "wasm32"))]
        let provider: Option<Arc<dyn FeatureInfoProvider>> = Some(Arc::new(
            super::WmsFeatureInfoProvider::new(url.clone(), layers.clone()),
        ));
        #[cfg(target_arch = "wasm32")]
        let provider: Option<Arc<dyn FeatureInfoProvider>> = None;

        Self {
            name: name.into(),
            url,
            layers,
            visible: AtomicBool::new(true),
            queryable: true,
            info: None,
            provider,
        }
    }

    /// Replaces the source of feature information.
    pub fn with_feature_info_provider(mut self, provider: Arc<dyn FeatureInfoProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the presentation metadata of the layer.
    pub fn with_info(mut self, info: LayerInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Sets whether feature information is requested for the layer.
    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    /// Sets initial visibility of the layer.
    pub fn with_visible(self, visible: bool) -> Self {
        self.visible.store(visible, Ordering::Relaxed);
        self
    }

    /// Url of the service.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Names of the service layers shown by this layer.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }
}

impl Layer for WmsLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::RemoteRaster
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    fn is_queryable(&self) -> bool {
        self.queryable && self.provider.is_some()
    }

    fn info(&self) -> Option<LayerInfo> {
        self.info.clone()
    }

    fn feature_info_provider(&self) -> Option<Arc<dyn FeatureInfoProvider>> {
        self.provider.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
