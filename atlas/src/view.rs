use atlas_types::cartesian::{CartesianPoint2d, Point2d, Rect};
use atlas_types::geo::Crs;

/// Size of the map viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns true if the size has no area.
    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Currently displayed part of the map: the center point, resolution (map units per pixel), viewport size and the
/// coordinate system the map is drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    position: Point2d,
    resolution: f64,
    size: Size,
    crs: Crs,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            position: Point2d::new(0.0, 0.0),
            resolution: 1.0,
            size: Size::default(),
            crs: Crs::EPSG3857,
        }
    }
}

impl MapView {
    /// Creates a new view centered at `position` (in `crs` coordinates).
    pub fn new(position: impl CartesianPoint2d<Num = f64>, resolution: f64, crs: Crs) -> Self {
        Self {
            position: Point2d::new(position.x(), position.y()),
            resolution,
            crs,
            ..Default::default()
        }
    }

    /// Center of the view.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// Returns a new view with the given center point.
    pub fn with_position(&self, position: impl CartesianPoint2d<Num = f64>) -> Self {
        Self {
            position: Point2d::new(position.x(), position.y()),
            ..self.clone()
        }
    }

    /// Map units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns a new view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..self.clone()
        }
    }

    /// Size of the viewport.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a new view with the given viewport size.
    pub fn with_size(&self, size: Size) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// Coordinate system of the map.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Converts a pixel position (origin in the top left corner of the viewport) into map coordinates.
    pub fn screen_to_map(&self, px: impl CartesianPoint2d<Num = f64>) -> Point2d {
        Point2d::new(
            self.position.x + (px.x() - self.size.width / 2.0) * self.resolution,
            self.position.y - (px.y() - self.size.height / 2.0) * self.resolution,
        )
    }

    /// Converts map coordinates into a pixel position.
    pub fn map_to_screen(&self, point: impl CartesianPoint2d<Num = f64>) -> Point2d {
        Point2d::new(
            (point.x() - self.position.x) / self.resolution + self.size.width / 2.0,
            (self.position.y - point.y()) / self.resolution + self.size.height / 2.0,
        )
    }

    /// Returns true if the pixel lies inside the viewport.
    pub fn contains_pixel(&self, px: impl CartesianPoint2d<Num = f64>) -> bool {
        (0.0..=self.size.width).contains(&px.x()) && (0.0..=self.size.height).contains(&px.y())
    }

    /// Area of the map covered by the view. `None` if the viewport has no area.
    pub fn get_bbox(&self) -> Option<Rect> {
        if self.size.is_zero() {
            return None;
        }

        Some(Rect::from_center(
            &self.position,
            self.size.width * self.resolution / 2.0,
            self.size.height * self.resolution / 2.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        MapView::new(Point2d::new(1000.0, 2000.0), 2.0, Crs::EPSG3857)
            .with_size(Size::new(100.0, 50.0))
    }

    #[test]
    fn screen_to_map() {
        let view = view();
        assert_eq!(
            view.screen_to_map(Point2d::new(50.0, 25.0)),
            Point2d::new(1000.0, 2000.0)
        );
        assert_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(900.0, 2050.0)
        );
        assert_eq!(
            view.map_to_screen(Point2d::new(900.0, 2050.0)),
            Point2d::new(0.0, 0.0)
        );
    }

    #[test]
    fn bbox() {
        let bbox = view().get_bbox().unwrap();
        assert_eq!(bbox, Rect::new(900.0, 1950.0, 1100.0, 2050.0));
        assert!(MapView::default().get_bbox().is_none());
    }

    #[test]
    fn contains_pixel() {
        assert!(view().contains_pixel(Point2d::new(10.0, 10.0)));
        assert!(!view().contains_pixel(Point2d::new(-1.0, 10.0)));
    }
}
