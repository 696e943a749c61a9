//! Printing of the map: the preview of the printed area and the print job sent to the print service.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use atlas_types::cartesian::{Point2d, Rect};
use atlas_types::Polygon;
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::color::Color;
use crate::config::ExportConfig;
use crate::error::AtlasError;
use crate::layer::{Layer, LayerKind, LayerRef};
use crate::map::Map;

mod request;

pub use request::{
    Orientation, PrintOptions, PrintRequest, VectorPrintAttributes, VectorPrintFeature,
    VectorPrintLayer, VectorPrintStyle, WmsPrintLayer, WmtsPrintLayer,
};

/// Name of the print preview layer.
pub const PREVIEW_LAYER_NAME: &str = "preview-layer";

/// Size of a screen pixel in millimeters assumed by map services (OGC standardized rendering pixel).
const PIXEL_SIZE_MM: f64 = 0.28;
/// Dots per inch of standardized rendering pixels.
const STANDARD_DPI: f64 = 25.4 / PIXEL_SIZE_MM;
/// Inches in a meter.
const INCHES_PER_UNIT: f64 = 39.37;

/// Size of the paper in standardized rendering pixels (0.28 mm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PaperSize {
    /// A4 in portrait orientation.
    pub const A4: PaperSize = PaperSize {
        width: 210.0 / PIXEL_SIZE_MM,
        height: 297.0 / PIXEL_SIZE_MM,
    };
    /// A3 in portrait orientation.
    pub const A3: PaperSize = PaperSize {
        width: 297.0 / PIXEL_SIZE_MM,
        height: 420.0 / PIXEL_SIZE_MM,
    };

    /// Size of the paper with the given dimensions in millimeters.
    pub fn from_mm(width: f64, height: f64) -> Self {
        Self {
            width: width / PIXEL_SIZE_MM,
            height: height / PIXEL_SIZE_MM,
        }
    }

    /// The same paper turned to the orientation.
    pub fn oriented(self, orientation: Orientation) -> Self {
        let (short, long) = if self.width <= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };

        match orientation {
            Orientation::Portrait => Self {
                width: short,
                height: long,
            },
            Orientation::Landscape => Self {
                width: long,
                height: short,
            },
        }
    }

    /// Area of the map, in map units (meters), covered by the paper at the scale when centered at `center`.
    pub fn extent(&self, scale: f64, center: &Point2d) -> Rect {
        let half_width = self.width / STANDARD_DPI / INCHES_PER_UNIT * scale / 2.0;
        let half_height = self.height / STANDARD_DPI / INCHES_PER_UNIT * scale / 2.0;

        Rect::from_center(center, half_width, half_height)
    }
}

/// Overlay layer showing the area that is going to be printed.
pub struct PreviewLayer {
    area: RwLock<Option<Rect>>,
    visible: AtomicBool,
}

impl PreviewLayer {
    /// Outline of the preview rectangle.
    pub const STROKE_COLOR: Color = Color::rgba(0, 0, 0, 179);
    /// Fill of the preview rectangle.
    pub const FILL_COLOR: Color = Color::rgba(255, 145, 20, 102);

    fn new() -> Self {
        Self {
            area: RwLock::new(None),
            visible: AtomicBool::new(true),
        }
    }

    /// The previewed area.
    pub fn area(&self) -> Option<Rect> {
        *self.area.read()
    }

    /// Polygon outlining the previewed area.
    pub fn polygon(&self) -> Option<Polygon<Point2d>> {
        self.area().map(|area| Polygon::from(area.into_contour()))
    }
}

impl Layer for PreviewLayer {
    fn name(&self) -> &str {
        PREVIEW_LAYER_NAME
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Overlay
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

/// Print service rendering print jobs into documents.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PrintClient: MaybeSend + MaybeSync {
    /// Renders the job and returns the url of the document.
    async fn print(&self, request: &PrintRequest) -> Result<String, AtlasError>;
}

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use async_trait::async_trait;

    use super::{PrintClient, PrintRequest};
    use crate::config::ExportConfig;
    use crate::error::AtlasError;
    use crate::platform::{PlatformService, PlatformServiceImpl};

    /// Posts print jobs as JSON to the print service.
    pub struct HttpPrintClient {
        url: String,
        platform_service: PlatformServiceImpl,
    }

    impl HttpPrintClient {
        /// Creates a client posting to `url`.
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                platform_service: PlatformServiceImpl::new(),
            }
        }

        /// Creates a client for the configured print service.
        pub fn from_config(config: &ExportConfig) -> Self {
            Self::new(&config.export_url)
        }
    }

    #[async_trait]
    impl PrintClient for HttpPrintClient {
        async fn print(&self, request: &PrintRequest) -> Result<String, AtlasError> {
            let body = serde_json::to_string(request)?;
            let response = self
                .platform_service
                .post_text(&self.url, body, "application/json")
                .await?;

            Ok(response.trim().trim_matches('"').to_string())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpPrintClient;

/// Print tool.
///
/// The user first places the preview of the printed area on the map with [`PrintTool::add_preview`], then the tool
/// builds the print job for that area.
pub struct PrintTool {
    config: ExportConfig,
    preview: Arc<PreviewLayer>,
}

impl Default for PrintTool {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl PrintTool {
    /// Creates a tool without a preview.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            preview: Arc::new(PreviewLayer::new()),
        }
    }

    /// Configuration of the tool.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The preview layer.
    pub fn preview_layer(&self) -> &Arc<PreviewLayer> {
        &self.preview
    }

    /// Reference to the preview layer, to be added to a map.
    pub fn preview_layer_ref(&self) -> LayerRef {
        LayerRef::from(self.preview.clone())
    }

    /// Shows the area the `paper` covers at the `scale` around the `center`, replacing the previous preview.
    pub fn add_preview(&self, scale: f64, paper: PaperSize, center: &Point2d) -> Rect {
        let area = paper.extent(scale, center);
        *self.preview.area.write() = Some(area);

        area
    }

    /// Removes the preview.
    pub fn remove_preview(&self) {
        *self.preview.area.write() = None;
    }

    /// Builds the print job for the previewed area of the map.
    pub fn request(&self, map: &Map, options: &PrintOptions) -> Result<PrintRequest, AtlasError> {
        let area = self.preview.area().ok_or(AtlasError::NotFound)?;
        Ok(PrintRequest::new(map, area, options))
    }

    /// Sends the print job for the previewed area to the print service. Returns the url of the printed document.
    pub async fn export_pdf<C>(
        &self,
        client: &C,
        map: &Map,
        options: &PrintOptions,
    ) -> Result<String, AtlasError>
    where
        C: PrintClient + ?Sized,
    {
        let request = self.request(map, options)?;
        log::debug!(
            "Printing {:?} at 1:{} with {} WMS layers",
            request.bbox,
            request.scale,
            request.wms_layers.len()
        );

        client.print(&request).await
    }
}
