//! Drawing tool: user drawn shapes, their styles and their exchange with other tools through KML documents.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use atlas_types::cartesian::Point2d;
use atlas_types::geo::Crs;
use atlas_types::Geom;
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::config::DrawSettings;
use crate::error::AtlasError;
use crate::feature::Feature;
use crate::layer::{Layer, LayerKind, LayerRef};

pub mod kml;
mod shape;
mod style;

pub use shape::{DrawnShape, Position, ShapeKind, ShapeProperties};
pub use style::{
    resolve_style, LineStyle, PointImage, ResolvedStyle, Stroke, StyleAttributes, TextStyle,
};

/// Name of the folder exported documents put the shapes in.
pub const EXPORT_FOLDER_NAME: &str = "drawings";

/// Result of encoding the drawn shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KmlExport {
    /// Nothing is drawn, so there is nothing to export.
    NoFeatures,
    /// The KML document.
    Document(String),
}

/// Result of exporting the drawn shapes to the export service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedKml {
    /// Nothing is drawn. The export service was not called.
    NoFeatures,
    /// Url the exported document can be downloaded from.
    Url(String),
}

/// Service storing exported KML documents.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KmlExporter: MaybeSend + MaybeSync {
    /// Stores the document and returns the url it can be downloaded from.
    async fn export(&self, document: String) -> Result<String, AtlasError>;
}

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use async_trait::async_trait;

    use super::KmlExporter;
    use crate::config::DrawSettings;
    use crate::error::AtlasError;
    use crate::platform::{PlatformService, PlatformServiceImpl};

    /// Posts documents to an HTTP endpoint that responds with the download url.
    #[derive(Debug)]
    pub struct HttpKmlExporter {
        url: String,
        platform_service: PlatformServiceImpl,
    }

    impl HttpKmlExporter {
        /// Creates an exporter posting to `url`.
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                platform_service: PlatformServiceImpl::new(),
            }
        }

        /// Creates an exporter for the export service configured in the settings.
        pub fn from_settings(settings: &DrawSettings) -> Result<Self, AtlasError> {
            match settings.kml_export_url.as_deref() {
                Some(url) if !url.is_empty() => Ok(Self::new(url)),
                _ => Err(AtlasError::Configuration("kmlExportUrl is not set".into())),
            }
        }

        /// Url the documents are posted to.
        pub fn url(&self) -> &str {
            &self.url
        }
    }

    #[async_trait]
    impl KmlExporter for HttpKmlExporter {
        async fn export(&self, document: String) -> Result<String, AtlasError> {
            let response = self
                .platform_service
                .post_text(&self.url, document, "application/vnd.google-earth.kml+xml")
                .await?;
            Ok(response.trim().to_string())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpKmlExporter;

/// Overlay layer displaying the drawn shapes.
///
/// Shapes drawn later are on top of earlier ones.
pub struct DrawLayer {
    name: String,
    shapes: RwLock<Vec<DrawnShape>>,
    visible: AtomicBool,
}

impl DrawLayer {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shapes: RwLock::new(vec![]),
            visible: AtomicBool::new(true),
        }
    }

    /// Copies of the shapes of the layer, in drawing order.
    pub fn shapes(&self) -> Vec<DrawnShape> {
        self.shapes.read().clone()
    }

    /// Number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.read().len()
    }

    /// Returns true if nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.shapes.read().is_empty()
    }
}

impl Layer for DrawLayer {
    fn name(&self) -> &str {
        &self.name
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

    fn features_at(&self, point: &Point2d, tolerance: f64) -> Vec<Feature> {
        self.shapes
            .read()
            .iter()
            .rev()
            .filter(|shape| shape.geometry.is_point_inside(point, tolerance))
            .map(DrawnShape::to_feature)
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Drawing tool.
///
/// Owns the shapes drawn on the map (through its [`DrawLayer`]) and the settings new shapes are styled with. Shapes
/// keep their style when the settings change later, the same way they keep it through export and import.
///
/// ```ignore
/// let tool = DrawTool::new(DrawSettings::default());
/// map.layers_mut().push_ref(tool.layer_ref());
///
/// tool.add_shape(Contour::open(points))?;
/// match tool.export(&HttpKmlExporter::new(url), map.view().crs()).await? {
///     ExportedKml::Url(url) => println!("Download at {url}"),
///     ExportedKml::NoFeatures => println!("Nothing to export"),
/// }
/// ```
pub struct DrawTool {
    settings: DrawSettings,
    layer: Arc<DrawLayer>,
}

impl Default for DrawTool {
    fn default() -> Self {
        Self::new(DrawSettings::default())
    }
}

impl DrawTool {
    /// Creates a tool with an empty draw layer.
    pub fn new(settings: DrawSettings) -> Self {
        let layer = Arc::new(DrawLayer::new(&settings.draw_layer_name));
        Self { settings, layer }
    }

    /// Settings of the tool.
    pub fn settings(&self) -> &DrawSettings {
        &self.settings
    }

    /// Mutable access to the settings. Changes apply to shapes drawn afterwards.
    pub fn settings_mut(&mut self) -> &mut DrawSettings {
        &mut self.settings
    }

    /// Replaces the settings of the tool. The name of the draw layer does not change.
    pub fn set_settings(&mut self, settings: DrawSettings) {
        self.settings = settings;
    }

    /// The draw layer.
    pub fn layer(&self) -> &Arc<DrawLayer> {
        &self.layer
    }

    /// Reference to the draw layer, to be added to a map.
    pub fn layer_ref(&self) -> LayerRef {
        LayerRef::from(self.layer.clone())
    }

    /// Copies of the drawn shapes.
    pub fn shapes(&self) -> Vec<DrawnShape> {
        self.layer.shapes()
    }

    /// Number of drawn shapes.
    pub fn len(&self) -> usize {
        self.layer.len()
    }

    /// Returns true if nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    /// Adds a shape with the given geometry (in map coordinates), styled with the current settings. Returns the index
    /// of the new shape.
    pub fn add_shape(&self, geometry: impl Into<Geom<Point2d>>) -> Result<usize, AtlasError> {
        let geometry = geometry.into();
        let geometry_type = geometry.geometry_type().name();
        let mut shape =
            DrawnShape::new(geometry).ok_or(AtlasError::UnsupportedGeometry(geometry_type))?;
        shape.style = self.default_style(&shape);

        Ok(self.push(shape))
    }

    /// Adds a text label at the point. Returns the index of the new shape.
    pub fn add_text(&self, position: Point2d, text: impl Into<String>) -> usize {
        let mut shape = DrawnShape::text(position, text);
        shape.style = self.default_style(&shape);

        self.push(shape)
    }

    /// Turns the shape at `index` into a text label with the given text.
    pub fn set_text(&self, index: usize, text: impl Into<String>) -> Result<(), AtlasError> {
        let mut shapes = self.layer.shapes.write();
        let shape = shapes.get_mut(index).ok_or(AtlasError::NotFound)?;
        shape.update_from_text(text);
        shape.style = self.default_style(shape);

        Ok(())
    }

    /// Removes the topmost shape hit by the `point` with the given `tolerance` (both in map units).
    pub fn remove_at(&self, point: &Point2d, tolerance: f64) -> Option<DrawnShape> {
        let mut shapes = self.layer.shapes.write();
        let index = shapes
            .iter()
            .rposition(|shape| shape.geometry.is_point_inside(point, tolerance))?;

        Some(shapes.remove(index))
    }

    /// Removes all shapes.
    pub fn clear(&self) {
        self.layer.shapes.write().clear();
    }

    /// Switches measurement labels on or off and updates the labels of all shapes except text labels. Returns the new
    /// state.
    pub fn toggle_labels(&mut self) -> bool {
        self.settings.show_labels = !self.settings.show_labels;
        let show_labels = self.settings.show_labels;

        for shape in self.layer.shapes.write().iter_mut() {
            if shape.kind != ShapeKind::Text {
                shape.style.text = shape.label_text(show_labels);
            }
        }

        show_labels
    }

    /// Render style of the shape at `index`.
    pub fn resolved_style(&self, index: usize) -> Option<ResolvedStyle> {
        let shapes = self.layer.shapes.read();
        let shape = shapes.get(index)?;

        Some(resolve_style(
            shape.kind,
            &self.settings,
            &shape.style.text,
            Some(&shape.style),
        ))
    }

    /// Imports the placemarks of a KML document (in geographic coordinates) as shapes in the `map_crs`. Returns the
    /// number of imported shapes.
    ///
    /// Shapes exported by this tool get back their exact style. Others, and those with a style that cannot be read,
    /// are styled with the current settings.
    pub fn import_kml(&self, document: &str, map_crs: &Crs) -> Result<usize, AtlasError> {
        let placemarks = kml::read_kml(document)?;
        let projection = Crs::WGS84
            .transformation_to(map_crs)
            .ok_or_else(|| projection_error(&Crs::WGS84, map_crs))?;

        let mut imported = Vec::with_capacity(placemarks.len());
        for placemark in placemarks {
            let Some(geometry) = placemark.geometry.project(&*projection) else {
                log::warn!(
                    "Skipping placemark {:?}: it cannot be projected into {}",
                    placemark.name.unwrap_or_default(),
                    map_crs.code()
                );
                continue;
            };

            let geometry_type = geometry.geometry_type().name();
            let Some(mut shape) = DrawnShape::new(geometry) else {
                log::warn!(
                    "Skipping placemark {:?}: {geometry_type} cannot be drawn",
                    placemark.name.unwrap_or_default()
                );
                continue;
            };

            shape.properties.name = placemark.name;
            shape.properties.description = placemark.description;
            self.restore_style(&mut shape, placemark.style.as_deref());
            imported.push(shape);
        }

        let count = imported.len();
        self.layer.shapes.write().extend(imported);

        Ok(count)
    }

    /// Encodes the drawn shapes, projected from the `map_crs` into geographic coordinates, into a KML document.
    pub fn export_kml(&self, map_crs: &Crs) -> Result<KmlExport, AtlasError> {
        let shapes = self.layer.shapes();
        if shapes.is_empty() {
            return Ok(KmlExport::NoFeatures);
        }

        let projection = map_crs
            .transformation_to(&Crs::WGS84)
            .ok_or_else(|| projection_error(map_crs, &Crs::WGS84))?;
        let shapes = shapes
            .iter()
            .map(|shape| {
                shape
                    .project(&*projection)
                    .ok_or_else(|| projection_error(map_crs, &Crs::WGS84))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KmlExport::Document(kml::write_kml(
            &shapes,
            EXPORT_FOLDER_NAME,
        )?))
    }

    /// Exports the drawn shapes with the `exporter`. The exporter is not called if nothing is drawn.
    pub async fn export<E>(&self, exporter: &E, map_crs: &Crs) -> Result<ExportedKml, AtlasError>
    where
        E: KmlExporter + ?Sized,
    {
        match self.export_kml(map_crs)? {
            KmlExport::NoFeatures => Ok(ExportedKml::NoFeatures),
            KmlExport::Document(document) => {
                Ok(ExportedKml::Url(exporter.export(document).await?))
            }
        }
    }

    fn push(&self, shape: DrawnShape) -> usize {
        let mut shapes = self.layer.shapes.write();
        shapes.push(shape);
        shapes.len() - 1
    }

    fn default_style(&self, shape: &DrawnShape) -> StyleAttributes {
        let label = shape.label_text(self.settings.show_labels);
        StyleAttributes::from_resolved(&resolve_style(shape.kind, &self.settings, &label, None))
    }

    fn restore_style(&self, shape: &mut DrawnShape, style: Option<&str>) {
        let stored = style.and_then(|style| {
            serde_json::from_str::<StyleAttributes>(style)
                .inspect_err(|err| log::warn!("Style attribute could not be parsed: {err}"))
                .ok()
        });

        match stored {
            Some(stored) => {
                if !stored.text.is_empty() {
                    shape.update_from_text(stored.text.clone());
                    if stored.point_radius > 0.0 {
                        shape.update_from_geometry();
                    }
                }
                shape.style = stored;
            }
            None => shape.style = self.default_style(shape),
        }
    }
}

fn projection_error(from: &Crs, to: &Crs) -> AtlasError {
    AtlasError::Projection(format!(
        "cannot project from {} to {}",
        from.code(),
        to.code()
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use atlas_types::cartesian::CartesianPoint2d;
    use atlas_types::{ClosedContour, Contour, MultiPolygon, Polygon};

    use super::*;
    use crate::color::Color;

    fn settings() -> DrawSettings {
        DrawSettings {
            show_labels: true,
            ..Default::default()
        }
    }

    fn square(x: f64, y: f64, size: f64) -> ClosedContour<Point2d> {
        ClosedContour::new(vec![
            Point2d::new(x, y),
            Point2d::new(x + size, y),
            Point2d::new(x + size, y + size),
            Point2d::new(x, y + size),
        ])
    }

    #[derive(Default)]
    struct CountingExporter {
        calls: AtomicUsize,
    }

    #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
    #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
    impl KmlExporter for CountingExporter {
        async fn export(&self, document: String) -> Result<String, AtlasError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(document.starts_with("<?xml"));
            Ok("https://maps.example.com/exports/drawings.kml".into())
        }
    }

    #[test]
    fn shapes_are_styled_with_settings() {
        let tool = DrawTool::new(settings());
        let index = tool
            .add_shape(Contour::open(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(30.0, 40.0),
            ]))
            .unwrap();

        let shape = &tool.shapes()[index];
        assert_eq!(shape.kind, ShapeKind::LineString);
        assert_eq!(shape.style.text, "50 m");
        assert_eq!(shape.style.stroke_color, Some(Color::rgb(15, 175, 255)));
        assert_eq!(shape.style.stroke_width, 3.0);

        let resolved = tool.resolved_style(index).unwrap();
        assert_eq!(resolved.halo.width, 5.0);
        assert_eq!(resolved.text.text, "50 m");
    }

    #[test]
    fn unsupported_geometry() {
        let tool = DrawTool::default();
        let result = tool.add_shape(Geom::MultiPoint(vec![Point2d::new(0.0, 0.0)]));
        assert_matches!(result, Err(AtlasError::UnsupportedGeometry("MultiPoint")));
        assert!(tool.is_empty());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn exporter_from_settings() {
        let mut settings = DrawSettings::default();
        assert_matches!(
            HttpKmlExporter::from_settings(&settings),
            Err(AtlasError::Configuration(_))
        );

        settings.kml_export_url = Some("/mapservice/export/kml".into());
        let exporter = HttpKmlExporter::from_settings(&settings).unwrap();
        assert_eq!(exporter.url(), "/mapservice/export/kml");
    }

    #[test]
    fn text_shapes() {
        let tool = DrawTool::default();
        let index = tool.add_text(Point2d::new(1.0, 1.0), "Harbour");
        let point = tool.add_shape(Point2d::new(5.0, 5.0)).unwrap();
        tool.set_text(point, "Pier").unwrap();

        let shapes = tool.shapes();
        assert_eq!(shapes[index].kind, ShapeKind::Text);
        assert_eq!(shapes[index].style.text, "Harbour");
        assert_eq!(shapes[point].kind, ShapeKind::Text);
        assert_eq!(shapes[point].style.text, "Pier");
        assert_eq!(shapes[point].style.point_radius, 0.0);

        assert_matches!(tool.set_text(10, "Nowhere"), Err(AtlasError::NotFound));
    }

    #[test]
    fn toggle_labels_keeps_texts() {
        let mut tool = DrawTool::default();
        tool.add_text(Point2d::new(1.0, 1.0), "Harbour");
        tool.add_shape(Point2d::new(319_500.0, 6_398_000.0)).unwrap();
        assert_eq!(tool.shapes()[1].style.text, "");

        assert!(tool.toggle_labels());
        let shapes = tool.shapes();
        assert_eq!(shapes[0].style.text, "Harbour");
        assert_eq!(shapes[1].style.text, "North: 6398000 East: 319500");

        assert!(!tool.toggle_labels());
        let shapes = tool.shapes();
        assert_eq!(shapes[0].style.text, "Harbour");
        assert_eq!(shapes[1].style.text, "");
    }

    #[test]
    fn remove_topmost_hit() {
        let tool = DrawTool::default();
        tool.add_shape(Polygon::from(square(0.0, 0.0, 10.0))).unwrap();
        tool.add_shape(Point2d::new(5.0, 5.0)).unwrap();

        let removed = tool.remove_at(&Point2d::new(5.5, 5.0), 1.0).unwrap();
        assert_eq!(removed.kind, ShapeKind::Point);
        let removed = tool.remove_at(&Point2d::new(5.5, 5.0), 1.0).unwrap();
        assert_eq!(removed.kind, ShapeKind::Polygon);
        assert!(tool.remove_at(&Point2d::new(5.5, 5.0), 1.0).is_none());

        tool.add_shape(Point2d::new(5.0, 5.0)).unwrap();
        tool.clear();
        assert!(tool.is_empty());
    }

    #[test]
    fn draw_layer_is_an_overlay() {
        let tool = DrawTool::default();
        tool.add_shape(Point2d::new(5.0, 5.0)).unwrap();

        let layer = tool.layer_ref();
        assert_eq!(layer.name(), "draw-layer");
        assert_eq!(layer.kind(), LayerKind::Overlay);

        let features = layer.features_at(&Point2d::new(5.0, 5.0), 0.5);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].str_attribute("type"), Some("Point"));
    }

    #[test]
    fn export_and_import_restore_shapes() {
        let mut tool = DrawTool::new(settings());
        tool.add_shape(Point2d::new(1_333_000.5, 7_910_000.25)).unwrap();
        tool.add_shape(Contour::open(vec![
            Point2d::new(1_333_000.0, 7_910_000.0),
            Point2d::new(1_334_000.0, 7_911_000.0),
        ]))
        .unwrap();
        tool.add_shape(MultiPolygon::from(vec![
            Polygon::new(
                square(1_330_000.0, 7_900_000.0, 1000.0),
                vec![square(1_330_100.0, 7_900_100.0, 100.0)],
            ),
            Polygon::from(square(1_340_000.0, 7_900_000.0, 500.0)),
        ]))
        .unwrap();
        tool.add_text(Point2d::new(1_335_000.0, 7_905_000.0), "Harbour");

        tool.settings_mut().line_style = LineStyle::Dash;
        tool.settings_mut().line_width = 6.0;
        tool.add_shape(Contour::open(vec![
            Point2d::new(1_333_000.0, 7_910_000.0),
            Point2d::new(1_333_500.0, 7_909_000.0),
        ]))
        .unwrap();

        let KmlExport::Document(document) = tool.export_kml(&Crs::EPSG3857).unwrap() else {
            panic!("expected a document");
        };
        assert!(document.contains("<name>drawings</name>"));

        let restored = DrawTool::new(DrawSettings::default());
        assert_eq!(restored.import_kml(&document, &Crs::EPSG3857).unwrap(), 5);

        let original = tool.shapes();
        let imported = restored.shapes();
        for (original, imported) in original.iter().zip(&imported) {
            assert_eq!(imported.kind, original.kind);
            assert_eq!(imported.style, original.style);

            let points = original.geometry.iter_points().zip(imported.geometry.iter_points());
            for (a, b) in points {
                assert_relative_eq!(a.x(), b.x(), epsilon = 1e-6);
                assert_relative_eq!(a.y(), b.y(), epsilon = 1e-6);
            }
        }

        assert_eq!(imported[3].properties.description.as_deref(), Some("Harbour"));
        assert_eq!(
            LineStyle::from_pattern(imported[4].style.stroke_dash.as_deref()),
            LineStyle::Dash
        );
    }

    #[test]
    fn import_without_style_uses_settings() {
        let document = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
            <Placemark>
              <name>Pier</name>
              <Point><coordinates>12,57,0</coordinates></Point>
            </Placemark>
            <Placemark>
              <name>Broken</name>
              <Point><coordinates>13,57</coordinates></Point>
              <ExtendedData><Data name="style"><value>{"strokeWidth": "wide"}</value></Data></ExtendedData>
            </Placemark>
            </Document></kml>"#;

        let tool = DrawTool::default();
        assert_eq!(tool.import_kml(document, &Crs::WGS84).unwrap(), 2);

        let shapes = tool.shapes();
        assert_eq!(shapes[0].properties.name.as_deref(), Some("Pier"));
        assert_eq!(shapes[0].geometry, Geom::Point(Point2d::new(12.0, 57.0)));
        for shape in &shapes {
            assert_eq!(shape.kind, ShapeKind::Point);
            assert_eq!(shape.style.point_radius, 7.0);
            assert_eq!(shape.style.point_color, Some(Color::rgb(15, 175, 255)));
        }
    }

    #[test]
    fn labelled_point_import() {
        let document = r#"<kml><Placemark>
              <Point><coordinates>12,57</coordinates></Point>
              <ExtendedData><Data name="style"><value>{"text":"North: 1 East: 2","pointRadius":7}</value></Data></ExtendedData>
            </Placemark><Placemark>
              <Point><coordinates>13,57</coordinates></Point>
              <ExtendedData><Data name="style"><value>{"text":"Harbour","pointRadius":0}</value></Data></ExtendedData>
            </Placemark></kml>"#;

        let tool = DrawTool::default();
        tool.import_kml(document, &Crs::WGS84).unwrap();

        let shapes = tool.shapes();
        assert_eq!(shapes[0].kind, ShapeKind::Point);
        assert_eq!(shapes[1].kind, ShapeKind::Text);
        assert_eq!(shapes[1].label_text(false), "Harbour");
    }

    #[test]
    fn empty_export() {
        let tool = DrawTool::default();
        let exporter = CountingExporter::default();

        assert_eq!(tool.export_kml(&Crs::EPSG3857).unwrap(), KmlExport::NoFeatures);
        let exported = tokio_test::block_on(tool.export(&exporter, &Crs::EPSG3857)).unwrap();
        assert_eq!(exported, ExportedKml::NoFeatures);
        assert_eq!(exporter.calls.load(Ordering::SeqCst), 0);

        tool.add_shape(Point2d::new(0.0, 0.0)).unwrap();
        let exported = tokio_test::block_on(tool.export(&exporter, &Crs::EPSG3857)).unwrap();
        assert_eq!(
            exported,
            ExportedKml::Url("https://maps.example.com/exports/drawings.kml".into())
        );
        assert_eq!(exporter.calls.load(Ordering::SeqCst), 1);
    }
}
