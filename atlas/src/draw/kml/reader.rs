use atlas_types::cartesian::Point2d;
use atlas_types::{ClosedContour, Contour, Geom, MultiPolygon, Polygon};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::coordinates::parse_coordinates;
use crate::error::AtlasError;

/// Placemark read from a KML document.
#[derive(Debug, Clone, PartialEq)]
pub struct KmlPlacemark {
    /// Name of the placemark.
    pub name: Option<String>,
    /// Description of the placemark.
    pub description: Option<String>,
    /// Serialized shape style from the placemark's extended data.
    pub style: Option<String>,
    /// Geometry in geographic coordinates (longitude, latitude).
    pub geometry: Geom<Point2d>,
}

#[derive(Default)]
struct PlacemarkBuilder {
    name: Option<String>,
    description: Option<String>,
    style: Option<String>,
    multi: bool,
    points: Vec<Point2d>,
    lines: Vec<Contour<Point2d>>,
    polygons: Vec<Polygon<Point2d>>,
    outer: Option<ClosedContour<Point2d>>,
    inner: Vec<ClosedContour<Point2d>>,
    error: Option<String>,
}

impl PlacemarkBuilder {
    /// Marks the placemark as unreadable. Only the first error is kept.
    fn fail(&mut self, error: impl ToString) {
        if self.error.is_none() {
            self.error = Some(error.to_string());
        }
    }

    fn build(self) -> Option<KmlPlacemark> {
        let multi = self.multi;
        let geometry = match (
            self.points.len(),
            self.lines.len(),
            self.polygons.len(),
        ) {
            (1, 0, 0) if !multi => Geom::Point(self.points[0]),
            (_, 0, 0) if !self.points.is_empty() => Geom::MultiPoint(self.points),
            (0, 1, 0) if !multi => self.lines.into_iter().next().map(Geom::Contour)?,
            (0, _, 0) if !self.lines.is_empty() => Geom::MultiContour(self.lines),
            (0, 0, 1) if !multi => self.polygons.into_iter().next().map(Geom::Polygon)?,
            (0, 0, _) if !self.polygons.is_empty() => {
                Geom::MultiPolygon(MultiPolygon::from(self.polygons))
            }
            _ => return None,
        };

        Some(KmlPlacemark {
            name: self.name,
            description: self.description,
            style: self.style,
            geometry,
        })
    }
}

/// Reads the placemarks of a KML document.
///
/// Services returning KML often wrap it as the escaped text content of their own root element. Such documents are
/// unwrapped and the inner document is read. Placemarks without geometry, with malformed coordinates, or mixing
/// geometries of different types are skipped with a warning.
pub fn read_kml(document: &str) -> Result<Vec<KmlPlacemark>, AtlasError> {
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);

    let mut placemarks = vec![];
    let mut stack: Vec<String> = vec![];
    let mut text = String::new();
    let mut data_name: Option<String> = None;
    let mut current: Option<PlacemarkBuilder> = None;
    let mut wrapped = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if stack.is_empty() && name != "kml" {
                    wrapped = true;
                }

                match name.as_str() {
                    "Placemark" => current = Some(PlacemarkBuilder::default()),
                    "MultiGeometry" => {
                        if let Some(placemark) = current.as_mut() {
                            placemark.multi = true;
                        }
                    }
                    "Data" => {
                        data_name = match e.try_get_attribute("name")? {
                            Some(attr) => Some(attr.unescape_value()?.into_owned()),
                            None => None,
                        };
                    }
                    _ => {}
                }

                stack.push(name);
                text.clear();
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    continue;
                };

                if stack.is_empty() {
                    if wrapped {
                        let inner = text.trim();
                        if !inner.starts_with('<') || !inner.contains("<kml") {
                            return Err(AtlasError::Decoding(format!(
                                "document root `{name}` contains no KML"
                            )));
                        }
                        return read_kml(inner);
                    }
                    break;
                }

                if name == "Placemark" {
                    if let Some(mut builder) = current.take() {
                        let name = builder.name.clone().unwrap_or_default();
                        match builder.error.take() {
                            Some(error) => log::warn!("Skipping placemark {name:?}: {error}"),
                            None => match builder.build() {
                                Some(placemark) => placemarks.push(placemark),
                                None => {
                                    log::warn!("Skipping placemark {name:?}: no supported geometry")
                                }
                            },
                        }
                    }
                    text.clear();
                    continue;
                }

                let parent = stack.last().map(String::as_str);
                let grandparent = stack.len().checked_sub(2).map(|i| stack[i].as_str());
                let Some(placemark) = current.as_mut() else {
                    text.clear();
                    continue;
                };

                match (name.as_str(), parent) {
                    ("name", Some("Placemark")) => placemark.name = Some(std::mem::take(&mut text)),
                    ("description", Some("Placemark")) => {
                        placemark.description = Some(std::mem::take(&mut text))
                    }
                    ("value", Some("Data")) if data_name.as_deref() == Some("style") => {
                        placemark.style = Some(std::mem::take(&mut text))
                    }
                    ("coordinates", Some("Point")) => match parse_coordinates(&text) {
                        Ok(points) => match points.into_iter().next() {
                            Some(point) => placemark.points.push(point),
                            None => placemark.fail("point without coordinates"),
                        },
                        Err(err) => placemark.fail(err),
                    },
                    ("coordinates", Some("LineString")) => match parse_coordinates(&text) {
                        Ok(points) => placemark.lines.push(Contour::open(points)),
                        Err(err) => placemark.fail(err),
                    },
                    ("coordinates", Some("LinearRing")) => match parse_coordinates(&text) {
                        Ok(points) => {
                            let ring = ClosedContour::from_ring(points);
                            match grandparent {
                                Some("innerBoundaryIs") => placemark.inner.push(ring),
                                _ => placemark.outer = Some(ring),
                            }
                        }
                        Err(err) => placemark.fail(err),
                    },
                    ("Polygon", _) => match placemark.outer.take() {
                        Some(outer) => {
                            let inner = std::mem::take(&mut placemark.inner);
                            placemark.polygons.push(Polygon::new(outer, inner));
                        }
                        None => {
                            placemark.inner.clear();
                            placemark.fail("polygon without outer boundary");
                        }
                    },
                    _ => {}
                }

                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(placemarks)
}
