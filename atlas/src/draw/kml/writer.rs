use std::sync::LazyLock;

use atlas_types::cartesian::Point2d;
use atlas_types::{Geom, Polygon};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;

use super::coordinates::format_coordinates;
use super::KML_NAMESPACE;
use crate::draw::shape::DrawnShape;
use crate::error::AtlasError;

type XmlResult = quick_xml::Result<()>;

#[allow(clippy::unwrap_used)]
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)|&").unwrap());

/// Encodes the shapes into a KML document with a folder called `name`.
///
/// Shapes must already be in geographic coordinates (longitude, latitude). The document contains a style per shape
/// followed by a placemark per shape. Each placemark carries the shape's style in its extended data, so it can be
/// restored exactly on import.
pub fn write_kml(shapes: &[DrawnShape], name: &str) -> Result<String, AtlasError> {
    let styles = shapes
        .iter()
        .map(|shape| serde_json::to_string(&shape.style))
        .collect::<Result<Vec<_>, _>>()?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element("kml")
        .with_attribute(("xmlns", KML_NAMESPACE))
        .write_inner_content(|w| -> XmlResult {
            w.create_element("Document").write_inner_content(|w| -> XmlResult {
                write_text(w, "name", name)?;
                w.create_element("Folder").write_inner_content(|w| -> XmlResult {
                    write_text(w, "name", name)?;
                    write_text(w, "open", "0")?;

                    for (i, shape) in shapes.iter().enumerate() {
                        write_style(w, i, shape)?;
                    }
                    for (i, (shape, style)) in shapes.iter().zip(&styles).enumerate() {
                        write_placemark(w, i, shape, style)?;
                    }

                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })?;

    String::from_utf8(writer.into_inner()).map_err(|err| AtlasError::Decoding(err.to_string()))
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> XmlResult {
    writer
        .create_element(name)
        .write_text_content(BytesText::from_escaped(partial_escape(text)))?;
    Ok(())
}

fn write_style(writer: &mut Writer<Vec<u8>>, index: usize, shape: &DrawnShape) -> XmlResult {
    let style = &shape.style;
    writer
        .create_element("Style")
        .with_attribute(("id", index.to_string().as_str()))
        .write_inner_content(|w| -> XmlResult {
            if !style.image.is_empty() {
                w.create_element("IconStyle").write_inner_content(|w| -> XmlResult {
                    // Markers are drawn in their native 32 px size.
                    write_text(w, "scale", "1")?;
                    w.create_element("Icon")
                        .write_inner_content(|w| write_text(w, "href", &style.image))?;
                    Ok(())
                })?;
            }

            if let Some(color) = style.stroke_color {
                w.create_element("LineStyle").write_inner_content(|w| -> XmlResult {
                    write_text(w, "color", &color.to_kml())?;
                    write_text(w, "width", &style.stroke_width.to_string())
                })?;
            }

            if let Some(color) = style.fill_color {
                w.create_element("PolyStyle")
                    .write_inner_content(|w| write_text(w, "color", &color.to_kml()))?;
            }

            Ok(())
        })?;
    Ok(())
}

fn write_placemark(
    writer: &mut Writer<Vec<u8>>,
    index: usize,
    shape: &DrawnShape,
    style: &str,
) -> XmlResult {
    let fallback = format!("Drawing object {}", index + 1);
    let properties = &shape.properties;

    let name = properties
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| Some(shape.style.text.clone()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| fallback.clone());

    writer.create_element("Placemark").write_inner_content(|w| -> XmlResult {
        write_text(w, "name", &name)?;
        match properties.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => write_text(w, "description", description)?,
            None => match attribute_table(shape) {
                Some(table) => {
                    w.create_element("description")
                        .write_cdata_content(BytesCData::new(table))?;
                }
                None => write_text(w, "description", &fallback)?,
            },
        }
        write_text(w, "styleUrl", &format!("#{index}"))?;
        write_geometry(w, &shape.geometry)?;

        w.create_element("ExtendedData").write_inner_content(|w| -> XmlResult {
            w.create_element("Data")
                .with_attribute(("name", "style"))
                .write_inner_content(|w| write_text(w, "value", style))?;
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

/// Html table with a row for every string attribute of the shape.
fn attribute_table(shape: &DrawnShape) -> Option<String> {
    let rows: String = shape
        .properties
        .attributes
        .iter()
        .filter_map(|(name, value)| Some((name, value.as_str()?)))
        .map(|(name, value)| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                strip_markup(name),
                strip_markup(value)
            )
        })
        .collect();

    (!rows.is_empty()).then(|| format!("<table>{rows}</table>"))
}

fn strip_markup(value: &str) -> String {
    MARKUP.replace_all(value, "").replace("]]>", "")
}

fn write_geometry(writer: &mut Writer<Vec<u8>>, geometry: &Geom<Point2d>) -> XmlResult {
    match geometry {
        Geom::Point(point) => write_point(writer, point),
        Geom::MultiPoint(points) => {
            writer
                .create_element("MultiGeometry")
                .write_inner_content(|w| -> XmlResult {
                    for point in points {
                        write_point(w, point)?;
                    }
                    Ok(())
                })?;
            Ok(())
        }
        Geom::Contour(contour) => write_line(writer, contour.points()),
        Geom::MultiContour(contours) => {
            writer
                .create_element("MultiGeometry")
                .write_inner_content(|w| -> XmlResult {
                    for contour in contours {
                        write_line(w, contour.points())?;
                    }
                    Ok(())
                })?;
            Ok(())
        }
        Geom::Polygon(polygon) => write_polygon(writer, polygon),
        Geom::MultiPolygon(multi_polygon) => {
            writer
                .create_element("MultiGeometry")
                .write_inner_content(|w| -> XmlResult {
                    for polygon in multi_polygon.parts() {
                        write_polygon(w, polygon)?;
                    }
                    Ok(())
                })?;
            Ok(())
        }
    }
}

fn write_point(writer: &mut Writer<Vec<u8>>, point: &Point2d) -> XmlResult {
    writer
        .create_element("Point")
        .write_inner_content(|w| write_text(w, "coordinates", &format_coordinates([point])))?;
    Ok(())
}

fn write_line(writer: &mut Writer<Vec<u8>>, points: &[Point2d]) -> XmlResult {
    writer
        .create_element("LineString")
        .write_inner_content(|w| write_text(w, "coordinates", &format_coordinates(points)))?;
    Ok(())
}

fn write_polygon(writer: &mut Writer<Vec<u8>>, polygon: &Polygon<Point2d>) -> XmlResult {
    writer.create_element("Polygon").write_inner_content(|w| -> XmlResult {
        for (i, ring) in polygon.iter_contours().enumerate() {
            let boundary = if i == 0 {
                "outerBoundaryIs"
            } else {
                "innerBoundaryIs"
            };

            w.create_element(boundary).write_inner_content(|w| -> XmlResult {
                w.create_element("LinearRing").write_inner_content(|w| -> XmlResult {
                    write_text(w, "coordinates", &format_coordinates(ring.iter_points_closing()))
                })?;
                Ok(())
            })?;
        }
        Ok(())
    })?;
    Ok(())
}
