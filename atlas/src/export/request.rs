use atlas_types::cartesian::{Point2d, Rect};
use atlas_types::Geom;
use serde::{Deserialize, Serialize};

use crate::draw::{DrawLayer, DrawnShape, LineStyle, ShapeKind, StyleAttributes};
use crate::layer::{WmsLayer, WmtsLayer};
use crate::map::Map;

/// Conversion factor from map units per scale unit to print pixels per dpi, used by the print service.
const PRINT_SIZE_FACTOR: f64 = 49.65;

/// Paper orientation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Height is larger than width.
    #[default]
    Portrait,
    /// Width is larger than height.
    Landscape,
}

/// Print settings chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Scale denominator, e.g. `10000` for 1:10000.
    pub scale: f64,
    /// Print resolution in dots per inch.
    pub resolution: f64,
    /// Paper orientation.
    pub orientation: Orientation,
    /// Paper format name, e.g. `A4`.
    pub format: String,
}

/// WMS layer to be rendered by the print service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsPrintLayer {
    /// Service url.
    pub url: String,
    /// Names of the WMS layers.
    pub layers: Vec<String>,
    /// Position among the printed WMS layers, bottom first.
    pub z_index: usize,
    /// Workspace of the layers on the server.
    pub workspace_prefix: Option<String>,
    /// Numeric id of the map coordinate system.
    pub coordinate_system_id: Option<u32>,
}

/// Tile layer to be rendered by the print service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmtsPrintLayer {
    /// Service url.
    pub url: String,
    /// Axis order hint.
    pub axis_mode: Option<String>,
}

/// Set of drawn shapes to be rendered by the print service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPrintLayer {
    /// The shapes.
    pub features: Vec<VectorPrintFeature>,
}

/// Drawn shape in the form the print service renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPrintFeature {
    /// Kind of the shape.
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Label and style.
    pub attributes: VectorPrintAttributes,
    /// All vertices of the shape in map coordinates, rings closed.
    pub coordinates: Vec<[f64; 2]>,
}

/// Label and style of a printed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPrintAttributes {
    /// Label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Style.
    pub style: VectorPrintStyle,
}

/// Style of a printed shape. Colors are `#rrggbb` strings with the opacity given separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorPrintStyle {
    /// Polygon fill.
    pub fill_color: String,
    /// Opacity of the polygon fill.
    pub fill_opacity: f64,
    /// Line and outline color.
    pub stroke_color: String,
    /// Line opacity.
    pub stroke_opacity: f64,
    /// Line width.
    pub stroke_width: f64,
    /// Line cap: `round`, `butt` or `square`.
    pub stroke_linecap: String,
    /// Dash style.
    pub stroke_dashstyle: LineStyle,
    /// Radius of point circles.
    pub point_radius: f64,
    /// Fill of point circles.
    pub point_fill_color: String,
    /// Marker image url, empty for circles.
    pub point_src: String,
    /// Label alignment, e.g. `cm` for center-middle.
    pub label_align: String,
    /// Label outline color.
    pub label_outline_color: String,
    /// Label outline width.
    pub label_outline_width: f64,
    /// Font size in points.
    pub font_size: String,
    /// Label color.
    pub font_color: String,
}

impl Default for VectorPrintStyle {
    fn default() -> Self {
        Self {
            fill_color: "#FC345C".into(),
            fill_opacity: 0.5,
            stroke_color: "#FC345C".into(),
            stroke_opacity: 1.0,
            stroke_width: 3.0,
            stroke_linecap: "round".into(),
            stroke_dashstyle: LineStyle::Solid,
            point_radius: 10.0,
            point_fill_color: "#FC345C".into(),
            point_src: String::new(),
            label_align: "cm".into(),
            label_outline_color: "white".into(),
            label_outline_width: 3.0,
            font_size: "16".into(),
            font_color: "#FFFFFF".into(),
        }
    }
}

impl VectorPrintStyle {
    /// Converts the style of a drawn shape. Values the shape does not define keep their defaults.
    pub fn from_attributes(style: &StyleAttributes) -> Self {
        let mut print_style = Self::default();

        if let Some(fill) = style.fill_color {
            print_style.fill_color = fill.to_hex6();
            print_style.fill_opacity = fill.opacity();
        }

        if let Some(stroke) = style.stroke_color {
            print_style.stroke_color = stroke.to_hex6();
            if style.stroke_width > 0.0 {
                print_style.stroke_width = style.stroke_width;
            }
            print_style.stroke_dashstyle = LineStyle::from_pattern(style.stroke_dash.as_deref());
        }

        if !style.image.is_empty() {
            print_style.point_src = style.image.clone();
        } else if let Some(point_color) = style.point_color {
            print_style.point_radius = style.point_radius;
            print_style.point_fill_color = point_color.to_hex6();
        }

        print_style
    }
}

/// Print job posted to the print service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    /// Visible WMS layers, bottom first.
    pub wms_layers: Vec<WmsPrintLayer>,
    /// Drawn shapes.
    pub vector_layers: Vec<VectorPrintLayer>,
    /// Visible tile layers, bottom first.
    pub wmts_layers: Vec<WmtsPrintLayer>,
    /// Size of the printed image in pixels.
    pub size: [u32; 2],
    /// Print resolution in dots per inch.
    pub resolution: f64,
    /// Printed area as `[left, right, bottom, top]`.
    pub bbox: [f64; 4],
    /// Paper orientation.
    pub orientation: Orientation,
    /// Paper format name.
    pub format: String,
    /// Scale denominator.
    pub scale: f64,
}

impl PrintRequest {
    /// Builds the print job for the `extent` (in map coordinates) of the map.
    pub fn new(map: &Map, extent: Rect, options: &PrintOptions) -> Self {
        let dx = extent.width().abs();
        let dy = extent.height().abs();

        Self {
            wms_layers: wms_layers(map),
            vector_layers: vector_layers(map),
            wmts_layers: wmts_layers(map),
            size: [
                print_size(dx, options.scale, options.resolution),
                print_size(dy, options.scale, options.resolution),
            ],
            resolution: options.resolution,
            bbox: [
                extent.x_min(),
                extent.x_max(),
                extent.y_min(),
                extent.y_max(),
            ],
            orientation: options.orientation,
            format: options.format.clone(),
            scale: options.scale,
        }
    }
}

fn print_size(distance: f64, scale: f64, dpi: f64) -> u32 {
    // Truncated towards zero.
    (PRINT_SIZE_FACTOR * (distance / scale) * dpi) as u32
}

fn wms_layers(map: &Map) -> Vec<WmsPrintLayer> {
    let coordinate_system_id = map.view().crs().srid();
    map.layers()
        .iter_visible()
        .filter_map(|layer| layer.downcast_ref::<WmsLayer>())
        .enumerate()
        .map(|(z_index, layer)| WmsPrintLayer {
            url: layer.url().to_string(),
            layers: layer.layers().to_vec(),
            z_index,
            workspace_prefix: None,
            coordinate_system_id,
        })
        .collect()
}

fn wmts_layers(map: &Map) -> Vec<WmtsPrintLayer> {
    map.layers()
        .iter_visible()
        .filter_map(|layer| layer.downcast_ref::<WmtsLayer>())
        .map(|layer| WmtsPrintLayer {
            url: layer.url().to_string(),
            axis_mode: layer.axis_mode().map(str::to_string),
        })
        .collect()
}

fn vector_layers(map: &Map) -> Vec<VectorPrintLayer> {
    map.layers()
        .iter()
        .filter_map(|layer| layer.downcast_ref::<DrawLayer>())
        .map(|layer| VectorPrintLayer {
            features: layer.shapes().iter().map(print_feature).collect(),
        })
        .collect()
}

fn print_feature(shape: &DrawnShape) -> VectorPrintFeature {
    let text = match shape.kind {
        ShapeKind::Text => Some(
            shape
                .properties
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| shape.properties.name.clone())
                .unwrap_or_default(),
        ),
        _ => Some(shape.style.text.clone()).filter(|text| !text.is_empty()),
    };

    VectorPrintFeature {
        kind: shape.kind,
        attributes: VectorPrintAttributes {
            text,
            style: VectorPrintStyle::from_attributes(&shape.style),
        },
        coordinates: coordinate_pairs(&shape.geometry),
    }
}

fn coordinate_pairs(geometry: &Geom<Point2d>) -> Vec<[f64; 2]> {
    let pair = |p: &Point2d| [p.x, p.y];
    match geometry {
        Geom::Point(point) => vec![pair(point)],
        Geom::MultiPoint(points) => points.iter().map(pair).collect(),
        Geom::Contour(contour) => contour.points().iter().map(pair).collect(),
        Geom::MultiContour(contours) => contours
            .iter()
            .flat_map(|c| c.points().iter().map(pair))
            .collect(),
        Geom::Polygon(polygon) => polygon
            .iter_contours()
            .flat_map(|ring| ring.iter_points_closing().map(pair))
            .collect(),
        Geom::MultiPolygon(multi_polygon) => multi_polygon
            .parts()
            .iter()
            .flat_map(|polygon| polygon.iter_contours())
            .flat_map(|ring| ring.iter_points_closing().map(pair))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use atlas_types::geo::Crs;
    use atlas_types::{ClosedContour, Polygon};

    use super::*;
    use crate::color::Color;
    use crate::draw::DrawTool;
    use crate::map::LayerCollection;
    use crate::view::MapView;

    fn options() -> PrintOptions {
        PrintOptions {
            scale: 10_000.0,
            resolution: 150.0,
            orientation: Orientation::Landscape,
            format: "A4".into(),
        }
    }

    #[test]
    fn size_and_bbox() {
        let map = Map::new(
            MapView::new(Point2d::new(0.0, 0.0), 1.0, Crs::EPSG3857),
            LayerCollection::default(),
        );
        let extent = Rect::new(1000.0, 2000.0, 3970.0, 4100.0);
        let request = PrintRequest::new(&map, extent, &options());

        // 49.65 * (2970 / 10000) * 150 = 2211.90...
        assert_eq!(request.size, [2211, 1563]);
        assert_eq!(request.bbox, [1000.0, 3970.0, 2000.0, 4100.0]);
        assert!(request.wms_layers.is_empty());
        assert!(request.vector_layers.is_empty());
    }

    #[test]
    fn layers() {
        let mut layers = LayerCollection::default();
        layers.push(WmtsLayer::new("topo", "https://tiles.example.com/wmts").with_axis_mode("natural"));
        layers.push(WmsLayer::new(
            "parcels",
            "https://maps.example.com/wms",
            vec!["parcels".into(), "buildings".into()],
        ));
        layers.push(WmsLayer::new("hidden", "https://maps.example.com/wms", vec!["roads".into()]).with_visible(false));
        layers.push(WmsLayer::new("zoning", "https://maps.example.com/wms", vec!["zoning".into()]));

        let draw = DrawTool::default();
        draw.add_shape(Polygon::from(ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
        ])))
        .unwrap();
        draw.add_text(Point2d::new(5.0, 5.0), "Harbour");
        layers.push_ref(draw.layer_ref());

        let map = Map::new(
            MapView::new(Point2d::new(0.0, 0.0), 1.0, Crs::EPSG3857),
            layers,
        );
        let request = PrintRequest::new(&map, Rect::new(0.0, 0.0, 100.0, 100.0), &options());

        let wms: Vec<_> = request
            .wms_layers
            .iter()
            .map(|l| (l.layers.join(","), l.z_index, l.coordinate_system_id))
            .collect();
        assert_eq!(
            wms,
            vec![
                ("parcels,buildings".to_string(), 0, Some(3857)),
                ("zoning".to_string(), 1, Some(3857)),
            ]
        );
        assert_eq!(request.wmts_layers[0].axis_mode.as_deref(), Some("natural"));

        let features = &request.vector_layers[0].features;
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].kind, ShapeKind::Polygon);
        assert_eq!(features[0].attributes.text, None);
        assert_eq!(features[0].coordinates.len(), 4);
        assert_eq!(features[0].attributes.style.fill_color, "#ffffff");
        assert_eq!(features[0].attributes.style.stroke_color, "#0fafff");
        assert_eq!(features[1].attributes.text.as_deref(), Some("Harbour"));
        assert_eq!(features[1].attributes.style.point_radius, 0.0);
    }

    #[test]
    fn print_style() {
        let style = StyleAttributes {
            image: "marker.png".into(),
            fill_color: Some(Color::rgba(255, 145, 20, 102)),
            stroke_color: Some(Color::BLACK),
            stroke_width: 0.0,
            stroke_dash: Some(vec![4.0, 14.0]),
            ..Default::default()
        };
        let print_style = VectorPrintStyle::from_attributes(&style);

        assert_eq!(print_style.fill_color, "#ff9114");
        assert_eq!(print_style.fill_opacity, 0.4);
        assert_eq!(print_style.stroke_color, "#000000");
        assert_eq!(print_style.stroke_width, 3.0);
        assert_eq!(print_style.stroke_dashstyle, LineStyle::Dot);
        assert_eq!(print_style.point_src, "marker.png");
        assert_eq!(print_style.point_radius, 10.0);

        let json = serde_json::to_value(&print_style).unwrap();
        assert_eq!(json["strokeDashstyle"], "dot");
        assert_eq!(json["labelAlign"], "cm");
    }
}
