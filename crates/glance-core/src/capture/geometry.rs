//! Selection geometry.

use serde::{Deserialize, Serialize};

/// A pointer position in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    /// The axis-aligned bounding box of two corner points.
    ///
    /// The origin is the component-wise minimum; width and height are the
    /// absolute coordinate differences.
    pub fn bounding(a: Point, b: Point) -> Self {
        let (min_x, min_y, max_x, max_y) = normalize_bounds(a.x, a.y, b.x, b.y);
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// True when either side has collapsed to zero.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Expands a degenerate rectangle to the minimal 1x1 capture region.
    pub fn clamp_to_minimum(self) -> Self {
        Self {
            width: self.width.max(1.0),
            height: self.height.max(1.0),
            ..self
        }
    }
}

/// Normalize min/max coordinates from arbitrary start/end points.
#[inline]
pub fn normalize_bounds(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_from_press_and_release() {
        let region = Region::bounding(Point::new(50.0, 50.0), Point::new(200.0, 150.0));

        assert_eq!(region.x, 50.0);
        assert_eq!(region.y, 50.0);
        assert_eq!(region.width, 150.0);
        assert_eq!(region.height, 100.0);
    }

    #[test]
    fn test_bounding_normalizes_reversed_drag() {
        let up_left = Region::bounding(Point::new(200.0, 150.0), Point::new(50.0, 50.0));
        let down_right = Region::bounding(Point::new(50.0, 50.0), Point::new(200.0, 150.0));

        assert_eq!(up_left, down_right);
    }

    #[test]
    fn test_degenerate_clamps_to_one_pixel() {
        let click = Region::bounding(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        assert!(click.is_degenerate());

        let clamped = click.clamp_to_minimum();
        assert_eq!(clamped.width, 1.0);
        assert_eq!(clamped.height, 1.0);
        assert_eq!(clamped.x, 10.0);
        assert_eq!(clamped.y, 10.0);
    }
}
