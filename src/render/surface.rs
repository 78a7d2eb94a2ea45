//! The drawable-surface capability the renderer draws through.
//!
//! The trait mirrors a 2D canvas context closely enough that a browser
//! canvas, a recording surface in tests, and the tiny-skia
//! [`PixmapSurface`](super::pixmap::PixmapSurface) can all sit behind it.

use crate::color::Rgba;
use crate::source::DecodedImage;

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `width`×`height`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }
}

/// Geometry of a gradient fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientShape {
    /// Colors vary along the line from `(x0, y0)` to `(x1, y1)`.
    Linear { x0: f32, y0: f32, x1: f32, y1: f32 },
    /// Colors vary from the center outwards up to `radius`.
    Radial { cx: f32, cy: f32, radius: f32 },
}

/// A gradient with its color stops in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub shape: GradientShape,
    pub stops: Vec<(f32, Rgba)>,
}

impl Gradient {
    pub fn new(shape: GradientShape) -> Self {
        Self {
            shape,
            stops: Vec::new(),
        }
    }

    /// Adds a stop; `offset` is clamped to 0-1.
    pub fn add_color_stop(&mut self, offset: f32, color: Rgba) {
        let offset = if offset.is_nan() { 0.0 } else { offset.clamp(0.0, 1.0) };
        self.stops.push((offset, color));
    }
}

/// What a filled shape is painted with.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    Gradient(Gradient),
}

/// Font selection for text calls.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Pixel size.
    pub size: f32,
    pub family: String,
}

impl FontSpec {
    pub fn new(size: f32, family: impl Into<String>) -> Self {
        Self {
            size,
            family: family.into(),
        }
    }
}

/// Drawing operations the renderer needs.
///
/// Every call composites source-over with alpha. Transform calls affect
/// subsequent shape and image calls until the matching [`restore`].
///
/// [`restore`]: Surface::restore
pub trait Surface {
    /// Resizes and clears the surface to transparent.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: RectF, fill: &Fill);

    /// Strokes the outline of `rect`, centered on its edges.
    fn stroke_rect(&mut self, rect: RectF, color: Rgba, line_width: f32);

    /// Fills the ellipse centered at `(cx, cy)` with radii `rx`, `ry`.
    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgba);

    /// Draws `image` scaled into `dest`.
    fn draw_image(&mut self, image: &DecodedImage, dest: RectF);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);

    /// Rotates clockwise by `radians`.
    fn rotate(&mut self, radians: f32);

    fn set_font(&mut self, font: &FontSpec);

    /// Outlines `text` with its baseline starting at `(x, y)`.
    fn stroke_text(&mut self, text: &str, x: f32, y: f32, color: Rgba, line_width: f32);

    /// Fills `text` with its baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba);
}
