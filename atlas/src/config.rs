//! Settings of the map tools, loaded from the JSON tool configuration block of the viewer.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::draw::LineStyle;
use crate::error::AtlasError;

/// Settings of the feature info tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoClickConfig {
    /// Marker image used to decorate a selected point.
    pub marker_img: String,
    /// Hit radius of a click, in pixels.
    pub hit_tolerance: f64,
    /// Caption of results from layers that have no caption configured.
    pub default_caption: String,
}

impl Default for InfoClickConfig {
    fn default() -> Self {
        Self {
            marker_img: "assets/icons/marker.png".into(),
            hit_tolerance: 5.0,
            default_caption: "Search result".into(),
        }
    }
}

/// Settings of the draw tool. Defaults are the styles new shapes get before the user changes anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawSettings {
    /// Name of the layer holding the drawn shapes.
    pub draw_layer_name: String,
    /// Whether measurement labels are shown next to the shapes.
    pub show_labels: bool,
    /// Fill color of point circles.
    pub point_color: Color,
    /// Radius of point circles, in pixels.
    pub point_radius: f64,
    /// Draw points with the marker image instead of a circle.
    pub point_symbol: bool,
    /// Marker image of points.
    pub marker_img: String,
    /// Stroke color of lines.
    pub line_color: Color,
    /// Stroke width of lines.
    pub line_width: f64,
    /// Dash style of lines.
    pub line_style: LineStyle,
    /// Outline color of polygons.
    pub polygon_line_color: Color,
    /// Outline width of polygons.
    pub polygon_line_width: f64,
    /// Outline dash style of polygons.
    pub polygon_line_style: LineStyle,
    /// Fill color of polygons. Alpha channel is replaced with `polygon_fill_opacity`.
    pub polygon_fill_color: Color,
    /// Fill opacity of polygons in `[0, 1]` range.
    pub polygon_fill_opacity: f64,
    /// Service the exported KML documents are posted to.
    pub kml_export_url: Option<String>,
}

impl Default for DrawSettings {
    fn default() -> Self {
        let blue = Color::rgb(15, 175, 255);
        Self {
            draw_layer_name: "draw-layer".into(),
            show_labels: false,
            point_color: blue,
            point_radius: 7.0,
            point_symbol: false,
            marker_img: "assets/icons/marker.png".into(),
            line_color: blue,
            line_width: 3.0,
            line_style: LineStyle::Solid,
            polygon_line_color: blue,
            polygon_line_width: 3.0,
            polygon_line_style: LineStyle::Solid,
            polygon_fill_color: Color::WHITE,
            polygon_fill_opacity: 0.5,
            kml_export_url: None,
        }
    }
}

/// Settings of the print tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Service the print requests are posted to.
    pub export_url: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_url: "/mapservice/export/pdf".into(),
        }
    }
}

/// Configuration of all map tools. Missing sections and fields take their default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Feature info tool.
    pub info_click: InfoClickConfig,
    /// Draw tool.
    pub draw: DrawSettings,
    /// Print tool.
    pub export: ExportConfig,
}

impl ToolsConfig {
    /// Loads the configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, AtlasError> {
        serde_json::from_str(json).map_err(|err| AtlasError::Configuration(err.to_string()))
    }
}
