use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::layer::{Layer, LayerKind};

/// Prerendered tile layer (WMTS). Carries no feature information.
pub struct WmtsLayer {
    name: String,
    url: String,
    axis_mode: Option<String>,
    visible: AtomicBool,
}

impl WmtsLayer {
    /// Creates a new visible tile layer.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            axis_mode: None,
            visible: AtomicBool::new(true),
        }
    }

    /// Sets the axis order hint passed to the print service (e.g. `natural` or `geographic`).
    pub fn with_axis_mode(mut self, axis_mode: impl Into<String>) -> Self {
        self.axis_mode = Some(axis_mode.into());
        self
    }

    /// Url of the tile service.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Axis order hint.
    pub fn axis_mode(&self) -> Option<&str> {
        self.axis_mode.as_deref()
    }
}

impl Layer for WmtsLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Tiles
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
