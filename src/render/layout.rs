//! Page geometry and the mapping from projected meters to page points.

use geo::{Coord, Rect};

/// A4 landscape, in PDF points
pub const PAGE_WIDTH: f32 = 842.0;
pub const PAGE_HEIGHT: f32 = 595.0;
pub const MARGIN: f32 = 36.0;

/// Axis-aligned box on the page, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.top()
    }
}

/// Uniform scale from a projected rectangle into a frame, centered.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    min: Coord<f64>,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    /// Fit `bounds` inside `frame` preserving aspect ratio.
    pub fn fit(bounds: Rect<f64>, frame: Frame) -> Self {
        let width = bounds.width().max(1.0);
        let height = bounds.height().max(1.0);
        let scale = (frame.width as f64 / width).min(frame.height as f64 / height);
        let offset_x = frame.x as f64 + (frame.width as f64 - width * scale) / 2.0;
        let offset_y = frame.y as f64 + (frame.height as f64 - height * scale) / 2.0;
        Self {
            min: bounds.min(),
            scale,
            offset_x,
            offset_y,
        }
    }

    pub fn to_page(&self, coord: Coord<f64>) -> (f32, f32) {
        (
            (self.offset_x + (coord.x - self.min.x) * self.scale) as f32,
            (self.offset_y + (coord.y - self.min.y) * self.scale) as f32,
        )
    }
}

/// Grow `rect` by `margin` on every side.
pub fn expand(rect: Rect<f64>, margin: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: rect.min().x - margin,
            y: rect.min().y - margin,
        },
        Coord {
            x: rect.max().x + margin,
            y: rect.max().y + margin,
        },
    )
}

/// Smallest rectangle covering both inputs.
pub fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
