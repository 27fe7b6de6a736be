use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }
}

/// Converts between the bottom-left-origin screen space used for display
/// frames and the top-left-origin space used for window geometry.
///
/// The flip is anchored on the top edge of a reference display, normally the
/// primary display (the one carrying the menu bar).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordinateConverter {
    reference_max_y: f64,
}

impl CoordinateConverter {
    pub fn from_reference_frame(reference: Rect) -> Self {
        Self { reference_max_y: reference.max_y() }
    }

    pub fn convert_point(&self, point: Point) -> Point {
        Point::new(point.x, self.reference_max_y - point.y)
    }

    pub fn convert_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            Point::new(rect.origin.x, self.reference_max_y - rect.max_y()),
            rect.size,
        )
    }
}

/// Flips `display_frame` into window space using `reference_frame` as the
/// anchor. The returned origin is the frame's top-left corner.
pub fn to_window_space(display_frame: Rect, reference_frame: Rect) -> Rect {
    CoordinateConverter::from_reference_frame(reference_frame).convert_rect(display_frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_frame_on_primary_display() {
        let primary = Rect::from_xywh(0.0, 0.0, 1440.0, 900.0);
        let visible = Rect::from_xywh(0.0, 0.0, 1440.0, 875.0);

        let flipped = to_window_space(visible, primary);

        assert_eq!(flipped.origin, Point::new(0.0, 25.0));
        assert_eq!(flipped.size, visible.size);
    }

    #[test]
    fn flips_frame_of_display_stacked_above_primary() {
        let primary = Rect::from_xywh(0.0, 0.0, 1440.0, 900.0);
        let above = Rect::from_xywh(0.0, 900.0, 1920.0, 1080.0);

        let flipped = to_window_space(above, primary);

        assert_eq!(flipped.origin.y, -1080.0);
    }

    #[test]
    fn convert_point_round_trips() {
        let converter =
            CoordinateConverter::from_reference_frame(Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
        let p = Point::new(3.0, 7.0);
        assert_eq!(converter.convert_point(converter.convert_point(p)), p);
    }
}
