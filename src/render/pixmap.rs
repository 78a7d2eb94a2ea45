//! Software [`Surface`] backed by a tiny-skia pixmap.

use std::io::Cursor;

use image::RgbaImage;
use resvg::tiny_skia::{
    Color, FillRule, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap,
    PixmapPaint, Point, PremultipliedColorU8, RadialGradient, Rect, Shader, SpreadMode, Stroke,
    Transform,
};
use tracing::warn;

use super::surface::{Fill, FontSpec, GradientShape, RectF, Surface};
use crate::color::Rgba;
use crate::error::Result;
use crate::font::FontAsset;
use crate::source::{DecodedImage, pixmap_to_rgba_image, rgba_image_to_pixmap};

/// An in-memory RGBA surface.
///
/// Text is rasterized with the registered [`FontAsset`]s; text calls are
/// positioned through the current transform's mapping of their origin but
/// are not rotated or scaled with it.
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
    saved: Vec<Transform>,
    fonts: Vec<FontAsset>,
    font: FontSpec,
}

impl PixmapSurface {
    /// Creates a transparent surface. Zero dimensions are raised to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: blank_pixmap(width, height),
            transform: Transform::identity(),
            saved: Vec::new(),
            fonts: Vec::new(),
            font: FontSpec::new(10.0, crate::font::DEFAULT_FAMILY),
        }
    }

    /// Registers a font for text calls.
    pub fn with_font(mut self, font: FontAsset) -> Self {
        self.add_font(font);
        self
    }

    pub fn add_font(&mut self, font: FontAsset) {
        self.fonts.push(font);
    }

    /// Straight-alpha pixel at `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Copies the surface into a straight-alpha image.
    pub fn to_image(&self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.to_image().write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    fn current_font(&self) -> Option<&FontAsset> {
        self.fonts
            .iter()
            .find(|f| f.family().eq_ignore_ascii_case(&self.font.family))
            .or_else(|| self.fonts.first())
    }

    /// Text coverage for the current font, or `None` when no font is loaded.
    fn text_coverage(&self, text: &str, x: f32, y: f32) -> Option<Vec<u8>> {
        let Some(font) = self.current_font() else {
            warn!(family = %self.font.family, "no font registered, skipping text");
            return None;
        };
        let mut origin = [Point::from_xy(x, y)];
        self.transform.map_points(&mut origin);
        Some(font.coverage(
            text,
            self.font.size,
            origin[0].x,
            origin[0].y,
            self.pixmap.width(),
            self.pixmap.height(),
        ))
    }

    /// Composites `color` over the surface, weighted per pixel by `coverage`.
    fn blend_coverage(&mut self, coverage: &[u8], color: Rgba) {
        for (dst, &cov) in self.pixmap.pixels_mut().iter_mut().zip(coverage) {
            if cov == 0 {
                continue;
            }
            let sa = color.a * cov as f32 / 255.0;
            let inv = 1.0 - sa;
            let over = |s: u8, d: u8| (s as f32 * sa + d as f32 * inv).round().min(255.0) as u8;
            let a = (255.0 * sa + dst.alpha() as f32 * inv).round().min(255.0) as u8;
            let r = over(color.r, dst.red()).min(a);
            let g = over(color.g, dst.green()).min(a);
            let b = over(color.b, dst.blue()).min(a);
            if let Some(px) = PremultipliedColorU8::from_rgba(r, g, b, a) {
                *dst = px;
            }
        }
    }
}

impl Surface for PixmapSurface {
    fn set_size(&mut self, width: u32, height: u32) {
        self.pixmap = blank_pixmap(width, height);
        self.transform = Transform::identity();
        self.saved.clear();
    }

    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn fill_rect(&mut self, rect: RectF, fill: &Fill) {
        let Some(rect) = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        let Some(shader) = shader(fill) else {
            return;
        };
        let paint = Paint {
            shader,
            ..Paint::default()
        };
        self.pixmap.fill_rect(rect, &paint, self.transform, None);
    }

    fn stroke_rect(&mut self, rect: RectF, color: Rgba, line_width: f32) {
        let Some(rect) = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, self.transform, None);
    }

    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgba) {
        let Some(bounds) = Rect::from_xywh(cx - rx, cy - ry, rx * 2.0, ry * 2.0) else {
            return;
        };
        let Some(path) = PathBuilder::from_oval(bounds) else {
            return;
        };
        self.pixmap
            .fill_path(&path, &solid(color), FillRule::Winding, self.transform, None);
    }

    fn draw_image(&mut self, image: &DecodedImage, dest: RectF) {
        if image.width() == 0 || image.height() == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let Some(src) = rgba_image_to_pixmap(&image.pixels) else {
            return;
        };
        let sx = dest.width / image.width() as f32;
        let sy = dest.height / image.height() as f32;
        let transform = self
            .transform
            .pre_translate(dest.x, dest.y)
            .pre_scale(sx, sy);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pre_translate(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform.pre_rotate(radians.to_degrees());
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32, color: Rgba, line_width: f32) {
        let Some(coverage) = self.text_coverage(text, x, y) else {
            return;
        };
        let (w, h) = self.size();
        let outline = dilate(&coverage, w as usize, h as usize, line_width / 2.0);
        self.blend_coverage(&outline, color);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba) {
        if let Some(coverage) = self.text_coverage(text, x, y) {
            self.blend_coverage(&coverage, color);
        }
    }
}

fn blank_pixmap(width: u32, height: u32) -> Pixmap {
    Pixmap::new(width.max(1), height.max(1))
        .or_else(|| {
            warn!(width, height, "surface size rejected, falling back to 1x1");
            Pixmap::new(1, 1)
        })
        .expect("a 1x1 pixmap always allocates")
}

fn sk_color(color: Rgba) -> Color {
    let [r, g, b, a] = color.to_rgba8();
    Color::from_rgba8(r, g, b, a)
}

fn solid(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(sk_color(color));
    paint
}

fn shader(fill: &Fill) -> Option<Shader<'static>> {
    match fill {
        Fill::Solid(color) => Some(Shader::SolidColor(sk_color(*color))),
        Fill::Gradient(gradient) => {
            let stops: Vec<GradientStop> = gradient
                .stops
                .iter()
                .map(|(offset, color)| GradientStop::new(*offset, sk_color(*color)))
                .collect();
            if stops.is_empty() {
                return None;
            }
            match gradient.shape {
                GradientShape::Linear { x0, y0, x1, y1 } => LinearGradient::new(
                    Point::from_xy(x0, y0),
                    Point::from_xy(x1, y1),
                    stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                ),
                GradientShape::Radial { cx, cy, radius } => RadialGradient::new(
                    Point::from_xy(cx, cy),
                    Point::from_xy(cx, cy),
                    radius,
                    stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                ),
            }
        }
    }
}

/// Grows a coverage mask by `radius` pixels in every direction.
fn dilate(mask: &[u8], width: usize, height: usize, radius: f32) -> Vec<u8> {
    if radius < 0.5 {
        return mask.to_vec();
    }
    let reach = radius.ceil() as isize;
    let r2 = radius * radius;
    let offsets: Vec<(isize, isize)> = (-reach..=reach)
        .flat_map(|dy| (-reach..=reach).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| ((dx * dx + dy * dy) as f32) <= r2)
        .collect();

    let mut out = vec![0u8; mask.len()];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let mut best = 0u8;
            for &(dx, dy) in &offsets {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                best = best.max(mask[ny as usize * width + nx as usize]);
                if best == 255 {
                    break;
                }
            }
            out[y as usize * width + x as usize] = best;
        }
    }
    out
}
