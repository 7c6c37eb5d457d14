//! tiny-skia backed surface that can be encoded as PNG.

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::surface::{Rgba, Surface};
use crate::error::{RenderError, RenderResult};

/// Segments lit for each digit, in the order top, top-right, bottom-right,
/// bottom, bottom-left, top-left, middle.
const DIGIT_SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],
    [false, true, true, false, false, false, false],
    [true, true, false, true, true, false, true],
    [true, true, true, true, false, false, true],
    [false, true, true, false, false, true, true],
    [true, false, true, true, false, true, true],
    [true, false, true, true, true, true, true],
    [true, true, true, false, false, false, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// Raster surface backed by a tiny-skia pixmap
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

/// Largest width or height a surface may have
pub const MAX_SURFACE_SIDE: u32 = 8192;

impl RasterSurface {
    /// Allocate a transparent surface. Each side must be in `1..=MAX_SURFACE_SIDE`.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
            return Err(RenderError::InvalidSurface { width, height });
        }
        let pixmap = Pixmap::new(width, height)
            .ok_or(RenderError::InvalidSurface { width, height })?;
        Ok(Self { pixmap })
    }

    /// Encode the current buffer as PNG
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap.encode_png().map_err(|e| RenderError::PngEncode {
            message: e.to_string(),
        })
    }

    /// Straight (non-premultiplied) color of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    fn paint(color: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        paint
    }

    fn stroke_segment(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &path,
                &Self::paint(color),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    /// Seven-segment digit glyph with its box's top-left at `(left, top)`
    fn draw_digit(&mut self, digit: usize, left: f32, top: f32, w: f32, h: f32, color: Rgba) {
        let Some(segments) = DIGIT_SEGMENTS.get(digit) else {
            return;
        };
        let mid = top + h / 2.0;
        let bottom = top + h;
        let right = left + w;
        let lines = [
            ((left, top), (right, top)),
            ((right, top), (right, mid)),
            ((right, mid), (right, bottom)),
            ((left, bottom), (right, bottom)),
            ((left, mid), (left, bottom)),
            ((left, top), (left, mid)),
            ((left, mid), (right, mid)),
        ];
        let stroke_width = (h / 7.0).max(1.0);
        for (lit, (from, to)) in segments.iter().zip(lines) {
            if *lit {
                self.stroke_segment(from, to, stroke_width, color);
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn fill_background(&mut self, color: Rgba) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        if let Some(path) = PathBuilder::from_circle(x as f32, y as f32, radius as f32) {
            self.pixmap.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, width: f64, color: Rgba) {
        if let Some(path) = PathBuilder::from_circle(x as f32, y as f32, radius as f32) {
            let stroke = Stroke {
                width: width as f32,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &path,
                &Self::paint(color),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba) {
        self.stroke_segment(
            (from.0 as f32, from.1 as f32),
            (to.0 as f32, to.1 as f32),
            width as f32,
            color,
        );
    }

    fn label(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgba) {
        // Only digits are needed: labels are 1-based node indices.
        let digits: Vec<usize> = text
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as usize)
            .collect();
        if digits.is_empty() {
            return;
        }

        let h = size as f32;
        let w = h * 0.5;
        let gap = h * 0.25;
        let total = digits.len() as f32 * w + (digits.len() as f32 - 1.0) * gap;
        let mut left = x as f32 - total / 2.0;
        let top = y as f32 - h / 2.0;

        for digit in digits {
            self.draw_digit(digit, left, top, w, h, color);
            left += w + gap;
        }
    }
}
