use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::shape::ShapeKind;
use crate::color::Color;
use crate::config::DrawSettings;

const DASH: [f64; 2] = [12.0, 7.0];
const DOT: [f64; 2] = [2.0, 7.0];
/// Dash patterns are doubled for lines wider than this.
const DASH_SCALE_WIDTH: f64 = 3.0;
/// Size of marker icons in pixels.
const ICON_SIZE: f64 = 32.0;

/// Dash style of a line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dash,
    /// Dots.
    Dot,
}

impl LineStyle {
    /// On/off pattern of the line with the given width. `None` for a solid line.
    pub fn dash_pattern(&self, width: f64) -> Option<Vec<f64>> {
        let pattern = match self {
            LineStyle::Solid => return None,
            LineStyle::Dash => DASH,
            LineStyle::Dot => DOT,
        };
        let scale = if width > DASH_SCALE_WIDTH { 2.0 } else { 1.0 };

        Some(pattern.iter().map(|v| v * scale).collect())
    }

    /// Recognizes the style of a dash pattern created by [`LineStyle::dash_pattern`].
    pub fn from_pattern(pattern: Option<&[f64]>) -> Self {
        match pattern.and_then(|p| p.first()) {
            None => LineStyle::Solid,
            Some(&first) if first == DASH[0] || first == DASH[0] * 2.0 => LineStyle::Dash,
            Some(_) => LineStyle::Dot,
        }
    }
}

/// Line style.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
    /// Dash pattern, `None` for a solid line.
    pub dash: Option<Vec<f64>>,
}

impl Stroke {
    fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }
}

/// How a point is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum PointImage {
    /// Marker image.
    Icon {
        /// Image url.
        src: String,
        /// Anchor: horizontal as a fraction of the width, vertical in pixels.
        anchor: [f64; 2],
        /// Image size in pixels.
        size: [f64; 2],
    },
    /// Filled circle with an outline.
    Circle {
        /// Radius in pixels.
        radius: f64,
        /// Fill color.
        fill: Color,
        /// Outline.
        stroke: Stroke,
    },
}

impl PointImage {
    fn icon(src: impl Into<String>) -> Self {
        Self::Icon {
            src: src.into(),
            anchor: [0.5, ICON_SIZE],
            size: [ICON_SIZE, ICON_SIZE],
        }
    }

    fn circle(radius: f64, fill: Color) -> Self {
        Self::Circle {
            radius,
            fill,
            stroke: Stroke::solid(Color::WHITE, 2.0),
        }
    }
}

/// Label of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Label text.
    pub text: String,
    /// Text color.
    pub fill: Color,
    /// Text outline.
    pub outline: Stroke,
    /// Offset of the label from the anchor point, in pixels.
    pub offset: [f64; 2],
    /// Scale of the font.
    pub scale: f64,
}

/// Render style of a drawn shape.
///
/// Shapes are drawn twice: first with a wide half transparent white `halo` line, then with the actual style on top, so
/// they stay visible on both light and dark backgrounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    /// Outer line drawn below the shape.
    pub halo: Stroke,
    /// Fill of polygons.
    pub fill: Color,
    /// Outline of polygons and lines.
    pub stroke: Stroke,
    /// Point symbol.
    pub image: PointImage,
    /// Label.
    pub text: TextStyle,
}

/// Style of a single shape in the form it is stored with the shape and embedded into exported documents.
///
/// Colors keep their alpha channel, so a style read back from an export is identical to the exported one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAttributes {
    /// Label text. Not empty for text shapes and for labelled shapes.
    #[serde(default)]
    pub text: String,
    /// Url of the marker icon, empty if the point is drawn as a circle.
    #[serde(default)]
    pub image: String,
    /// Radius of the point circle, `0` if the point is drawn as an icon or is a text anchor.
    #[serde(default, deserialize_with = "number_or_empty")]
    pub point_radius: f64,
    /// Fill of the point circle.
    #[serde(default, deserialize_with = "color_or_empty")]
    pub point_color: Option<Color>,
    /// Fill of polygons.
    #[serde(default, deserialize_with = "color_or_empty")]
    pub fill_color: Option<Color>,
    /// Opacity of `fill_color`, for consumers that read colors without the alpha channel.
    #[serde(default, deserialize_with = "optional_number")]
    pub fill_opacity: Option<f64>,
    /// Color of lines and polygon outlines.
    #[serde(default, deserialize_with = "color_or_empty")]
    pub stroke_color: Option<Color>,
    /// Width of lines and polygon outlines.
    #[serde(default, deserialize_with = "number_or_empty")]
    pub stroke_width: f64,
    /// Dash pattern of lines and polygon outlines.
    #[serde(default)]
    pub stroke_dash: Option<Vec<f64>>,
}

impl StyleAttributes {
    /// Extracts the stored form of the style.
    pub fn from_resolved(style: &ResolvedStyle) -> Self {
        let (image, point_radius, point_color) = match &style.image {
            PointImage::Icon { src, .. } => (src.clone(), 0.0, None),
            PointImage::Circle { radius, fill, .. } => (String::new(), *radius, Some(*fill)),
        };

        Self {
            text: style.text.text.clone(),
            image,
            point_radius,
            point_color,
            fill_color: Some(style.fill),
            fill_opacity: Some(style.fill.opacity()),
            stroke_color: Some(style.stroke.color),
            stroke_width: style.stroke.width,
            stroke_dash: style.stroke.dash.clone(),
        }
    }
}

/// Creates the render style of a shape of the given kind.
///
/// If `stored` is given, the shape's own style is used. Otherwise the style is built from the tool settings, with
/// `label` as the label text. The halo always follows the settings.
pub fn resolve_style(
    kind: ShapeKind,
    settings: &DrawSettings,
    label: &str,
    stored: Option<&StyleAttributes>,
) -> ResolvedStyle {
    let is_polygon = kind == ShapeKind::Polygon;
    let is_text = kind == ShapeKind::Text;
    let (line_color, line_width, line_style) = if is_polygon {
        (
            settings.polygon_line_color,
            settings.polygon_line_width,
            settings.polygon_line_style,
        )
    } else {
        (settings.line_color, settings.line_width, settings.line_style)
    };

    let halo = Stroke::solid(Color::WHITE.with_opacity(0.5), line_width + 2.0);

    let (fill, stroke, image, text) = match stored {
        Some(stored) => {
            let image = if stored.image.is_empty() {
                let radius = if is_text { 0.0 } else { stored.point_radius };
                PointImage::circle(radius, stored.point_color.unwrap_or(Color::TRANSPARENT))
            } else {
                PointImage::icon(&stored.image)
            };

            (
                stored.fill_color.unwrap_or(Color::TRANSPARENT),
                Stroke {
                    color: stored.stroke_color.unwrap_or(Color::TRANSPARENT),
                    width: stored.stroke_width,
                    dash: stored.stroke_dash.clone(),
                },
                image,
                stored.text.clone(),
            )
        }
        None => {
            let image = if settings.point_symbol && !is_text {
                PointImage::icon(&settings.marker_img)
            } else {
                let radius = if is_text { 0.0 } else { settings.point_radius };
                PointImage::circle(radius, settings.point_color)
            };

            (
                settings
                    .polygon_fill_color
                    .with_opacity(settings.polygon_fill_opacity),
                Stroke {
                    color: line_color,
                    width: line_width,
                    dash: line_style.dash_pattern(line_width),
                },
                image,
                label.to_string(),
            )
        }
    };

    ResolvedStyle {
        halo,
        fill,
        stroke,
        image,
        text: TextStyle {
            text,
            fill: Color::WHITE,
            outline: Stroke::solid(Color::rgb(0x55, 0x55, 0x55), 3.0),
            offset: if is_text { [0.0, 0.0] } else { [10.0, -15.0] },
            scale: 1.4,
        },
    }
}

// Styles written by older clients use empty strings for absent values.

fn number_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(optional_number(deserializer)?.unwrap_or_default())
}

fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid number: {s:?}"))),
        other => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn color_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Color>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Color::parse(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid color: {s:?}"))),
    }
}
