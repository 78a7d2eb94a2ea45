//! Userbar rendering.
//!
//! [`Renderer`] draws a [`UserbarOptions`] snapshot through the [`Surface`]
//! capability in a fixed layer order: base fill, gradient, stripes,
//! crosshatch, background image, icon, gloss ellipse, border, text.

pub mod pixmap;
pub mod stripes;
pub mod surface;

use serde_json::Value;
use tracing::{debug, warn};

use crate::color::Rgba;
use crate::error::Result;
use crate::font::DEFAULT_FAMILY;
use crate::options::{GradientDirection, GradientType, UserbarOptions};
use crate::source::{CachedLoader, DecodedImage, ImageLoader, SourceLoader};

use self::surface::{Fill, FontSpec, Gradient, GradientShape, RectF, Surface};

/// Opacity of the gloss ellipse over the top half.
const GLOSS_ALPHA: f32 = 0.4;

// ============================================================================
// Renderer
// ============================================================================

/// Draws userbars; holds nothing but its image loader.
pub struct Renderer<L> {
    loader: L,
}

impl Default for Renderer<CachedLoader<SourceLoader>> {
    fn default() -> Self {
        Self::new(CachedLoader::new(SourceLoader::new()))
    }
}

impl<L: ImageLoader> Renderer<L> {
    /// Renders with images resolved through `loader`.
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Loader used for background and icon images.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Renders a configuration document, rejecting documents that do not
    /// match the options model.
    pub fn render_document<S: Surface + ?Sized>(
        &self,
        document: &Value,
        surface: &mut S,
    ) -> Result<()> {
        let options = UserbarOptions::from_document(document)?;
        self.render(&options, surface);
        Ok(())
    }

    /// Draws `options` onto `surface`, resizing it first.
    ///
    /// Images that fail to decode are skipped with a warning.
    pub fn render<S: Surface + ?Sized>(&self, options: &UserbarOptions, surface: &mut S) {
        let (w, h) = (options.width, options.height);
        let (wf, hf) = (w as f32, h as f32);
        debug!(width = w, height = h, "rendering userbar");

        surface.set_size(w, h);
        surface.fill_rect(RectF::from_size(w, h), &Fill::Solid(Rgba::BLACK));

        if !options.gradients.is_empty() {
            let mut gradient = Gradient::new(gradient_shape(options, wf, hf));
            for stop in options.sorted_gradients() {
                gradient.add_color_stop(stop.position, stop.color);
            }
            surface.fill_rect(RectF::from_size(w, h), &Fill::Gradient(gradient));
        }

        if let Some(lines) = &options.diag_stripes {
            stripes::paint_stripes(surface, lines.spacing, lines.on_main_diagonal, lines.color);
        }

        if let Some(grid) = &options.diag_stripes_v2 {
            stripes::paint_crosshatch(surface, grid.spacing, grid.color);
        }

        if let Some(bg) = &options.background_image {
            if let Some(image) = self.decode(bg.src.as_deref(), "background") {
                let width = if bg.width > 0.0 { bg.width } else { image.width() as f32 };
                let height = if bg.height > 0.0 { bg.height } else { image.height() as f32 };
                surface.draw_image(&image, RectF::new(bg.x, bg.y, width, height));
            }
        }

        if let Some(icon) = &options.icon {
            if let Some(image) = self.decode(icon.src.as_deref(), "icon") {
                surface.save();
                surface.translate(icon.x + icon.width / 2.0, icon.y + icon.height / 2.0);
                surface.rotate(icon.angle.to_radians());
                surface.draw_image(
                    &image,
                    RectF::new(-icon.width / 2.0, -icon.height / 2.0, icon.width, icon.height),
                );
                surface.restore();
            }
        }

        surface.fill_ellipse(wf / 2.0, 0.0, wf / 2.0, hf / 2.0, Rgba::WHITE.with_alpha(GLOSS_ALPHA));

        if options.border.width > 0.0 {
            surface.stroke_rect(
                RectF::new(0.5, 0.5, wf - 1.0, hf - 1.0),
                options.border.color,
                options.border.width,
            );
        }

        let text = &options.text;
        surface.set_font(&FontSpec::new(text.size, DEFAULT_FAMILY));
        if let Some(stroke) = &text.stroke {
            surface.stroke_text(&text.value, text.x, text.y, stroke.color, stroke.width);
        }
        surface.fill_text(&text.value, text.x, text.y, text.color);
    }

    fn decode(&self, src: Option<&str>, layer: &'static str) -> Option<DecodedImage> {
        let src = src.filter(|s| !s.is_empty())?;
        match self.loader.load(src) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(layer, error = %e, "skipping layer that failed to decode");
                None
            }
        }
    }
}

fn gradient_shape(options: &UserbarOptions, w: f32, h: f32) -> GradientShape {
    match options.gradient_type {
        GradientType::Radial => GradientShape::Radial {
            cx: w / 2.0,
            cy: h / 2.0,
            radius: w.min(h) / 2.0,
        },
        GradientType::Linear => {
            let (x0, y0, x1, y1) = match options.gradient_direction {
                GradientDirection::ToBottom => (0.0, 0.0, 0.0, h),
                GradientDirection::ToLeft => (w, 0.0, 0.0, 0.0),
                GradientDirection::ToTop => (0.0, h, 0.0, 0.0),
                GradientDirection::ToRight | GradientDirection::Unknown => (0.0, 0.0, w, 0.0),
            };
            GradientShape::Linear { x0, y0, x1, y1 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixmap::PixmapSurface;
    use super::*;
    use crate::error::Error;
    use crate::options::{GradientStop, IconOptions};
    use image::RgbaImage;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        SetSize(u32, u32),
        FillRect(RectF, Fill),
        StrokeRect(RectF, Rgba, f32),
        Ellipse(f32, f32, f32, f32),
        Image(RectF),
        Save,
        Restore,
        Translate(f32, f32),
        Rotate(f32),
        Font(FontSpec),
        StrokeText(String, f32),
        FillText(String),
    }

    #[derive(Default)]
    struct RecordingSurface {
        size: (u32, u32),
        calls: Vec<Call>,
    }

    impl RecordingSurface {
        /// Calls other than the 1x1 stripe fills.
        fn shapes(&self) -> Vec<&Call> {
            self.calls
                .iter()
                .filter(|c| !matches!(c, Call::FillRect(r, _) if r.width == 1.0 && r.height == 1.0))
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.calls.push(Call::SetSize(width, height));
        }
        fn size(&self) -> (u32, u32) {
            self.size
        }
        fn fill_rect(&mut self, rect: RectF, fill: &Fill) {
            self.calls.push(Call::FillRect(rect, fill.clone()));
        }
        fn stroke_rect(&mut self, rect: RectF, color: Rgba, line_width: f32) {
            self.calls.push(Call::StrokeRect(rect, color, line_width));
        }
        fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, _color: Rgba) {
            self.calls.push(Call::Ellipse(cx, cy, rx, ry));
        }
        fn draw_image(&mut self, _image: &DecodedImage, dest: RectF) {
            self.calls.push(Call::Image(dest));
        }
        fn save(&mut self) {
            self.calls.push(Call::Save);
        }
        fn restore(&mut self) {
            self.calls.push(Call::Restore);
        }
        fn translate(&mut self, dx: f32, dy: f32) {
            self.calls.push(Call::Translate(dx, dy));
        }
        fn rotate(&mut self, radians: f32) {
            self.calls.push(Call::Rotate(radians));
        }
        fn set_font(&mut self, font: &FontSpec) {
            self.calls.push(Call::Font(font.clone()));
        }
        fn stroke_text(&mut self, text: &str, _x: f32, _y: f32, _color: Rgba, line_width: f32) {
            self.calls.push(Call::StrokeText(text.to_string(), line_width));
        }
        fn fill_text(&mut self, text: &str, _x: f32, _y: f32, _color: Rgba) {
            self.calls.push(Call::FillText(text.to_string()));
        }
    }

    /// Hands out a fixed-size image for any source except `"broken"`.
    struct StubLoader;

    impl ImageLoader for StubLoader {
        fn load(&self, src: &str) -> Result<DecodedImage> {
            if src == "broken" {
                return Err(Error::decode(src, "stub failure"));
            }
            Ok(DecodedImage::new(RgbaImage::new(40, 30)))
        }
    }

    fn plain_options() -> UserbarOptions {
        let mut options = UserbarOptions::default();
        options.diag_stripes = None;
        options.diag_stripes_v2 = None;
        options.background_image = None;
        options.icon = None;
        options
    }

    #[test]
    fn layers_are_drawn_in_order() {
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&plain_options(), &mut surface);

        assert_eq!(
            surface.calls,
            vec![
                Call::SetSize(350, 19),
                Call::FillRect(RectF::from_size(350, 19), Fill::Solid(Rgba::BLACK)),
                Call::Ellipse(175.0, 0.0, 175.0, 9.5),
                Call::StrokeRect(RectF::new(0.5, 0.5, 349.0, 18.0), Rgba::opaque(255, 0, 0), 1.0),
                Call::Font(FontSpec::new(10.0, "Visitor")),
                Call::StrokeText("hello world".into(), 2.5),
                Call::FillText("hello world".into()),
            ]
        );
    }

    #[test]
    fn zero_border_and_missing_stroke_are_skipped() {
        let mut options = plain_options();
        options.border.width = 0.0;
        options.text.stroke = None;
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&options, &mut surface);

        assert!(!surface.calls.iter().any(|c| matches!(c, Call::StrokeRect(..))));
        assert!(!surface.calls.iter().any(|c| matches!(c, Call::StrokeText(..))));
        assert!(matches!(surface.calls.last(), Some(Call::FillText(_))));
    }

    #[test]
    fn gradient_stops_reach_surface_sorted() {
        let mut options = plain_options();
        options.gradients = vec![
            GradientStop::new(0.8, Rgba::opaque(255, 0, 0)),
            GradientStop::new(0.2, Rgba::opaque(0, 255, 0)),
            GradientStop::new(0.5, Rgba::opaque(0, 0, 255)),
        ];
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&options, &mut surface);

        let Call::FillRect(_, Fill::Gradient(gradient)) = &surface.calls[2] else {
            panic!("expected the gradient fill third, got {:?}", surface.calls[2]);
        };
        let offsets: Vec<f32> = gradient.stops.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0.2, 0.5, 0.8]);
        assert_eq!(
            gradient.shape,
            GradientShape::Linear { x0: 0.0, y0: 0.0, x1: 350.0, y1: 0.0 }
        );
        // Rendering sorts a copy.
        assert_eq!(options.gradients[0].position, 0.8);
    }

    #[test]
    fn gradient_geometry_follows_type_and_direction() {
        let mut options = plain_options();
        options.gradient_direction = GradientDirection::ToTop;
        assert_eq!(
            gradient_shape(&options, 100.0, 20.0),
            GradientShape::Linear { x0: 0.0, y0: 20.0, x1: 0.0, y1: 0.0 }
        );
        options.gradient_direction = GradientDirection::Unknown;
        assert_eq!(
            gradient_shape(&options, 100.0, 20.0),
            GradientShape::Linear { x0: 0.0, y0: 0.0, x1: 100.0, y1: 0.0 }
        );
        options.gradient_type = GradientType::Radial;
        assert_eq!(
            gradient_shape(&options, 100.0, 20.0),
            GradientShape::Radial { cx: 50.0, cy: 10.0, radius: 10.0 }
        );
    }

    #[test]
    fn icon_is_rotated_about_its_center() {
        let mut options = plain_options();
        options.icon = Some(IconOptions {
            src: Some("logo.png".into()),
            x: 10.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            angle: 90.0,
        });
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&options, &mut surface);

        let shapes = surface.shapes();
        let start = shapes.iter().position(|c| **c == Call::Save).unwrap();
        assert_eq!(shapes[start + 1], &Call::Translate(20.0, 10.0));
        assert_eq!(shapes[start + 2], &Call::Rotate(90f32.to_radians()));
        assert_eq!(shapes[start + 3], &Call::Image(RectF::new(-10.0, -10.0, 20.0, 20.0)));
        assert_eq!(shapes[start + 4], &Call::Restore);
    }

    #[test]
    fn background_falls_back_to_natural_size() {
        let mut options = plain_options();
        options.background_image = Some(crate::options::BackgroundImage {
            src: Some("bg.png".into()),
            width: 350.0,
            height: 0.0,
            x: 0.0,
            y: -5.0,
        });
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&options, &mut surface);

        assert!(surface.calls.contains(&Call::Image(RectF::new(0.0, -5.0, 350.0, 30.0))));
    }

    #[test]
    fn failed_and_empty_sources_are_skipped() {
        let mut options = plain_options();
        options.background_image = Some(crate::options::BackgroundImage {
            src: Some("broken".into()),
            width: 0.0,
            height: 0.0,
            x: 0.0,
            y: 0.0,
        });
        options.icon = Some(IconOptions {
            src: Some(String::new()),
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            angle: 0.0,
        });
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&options, &mut surface);

        assert!(!surface.calls.iter().any(|c| matches!(c, Call::Image(_) | Call::Save)));
        assert!(matches!(surface.calls.last(), Some(Call::FillText(_))));
    }

    #[test]
    fn stripes_precede_the_ellipse() {
        let mut options = plain_options();
        options.diag_stripes = Some(crate::options::default_diag_stripes());
        let mut surface = RecordingSurface::default();
        Renderer::new(StubLoader).render(&options, &mut surface);

        let first_stripe = surface
            .calls
            .iter()
            .position(|c| matches!(c, Call::FillRect(r, _) if r.width == 1.0))
            .unwrap();
        let ellipse = surface
            .calls
            .iter()
            .position(|c| matches!(c, Call::Ellipse(..)))
            .unwrap();
        assert!(first_stripe > 1 && first_stripe < ellipse);
    }

    #[test]
    fn border_is_painted_at_the_inset() {
        let mut options = plain_options();
        options.width = 20;
        options.height = 10;
        options.border.color = Rgba::opaque(0, 255, 0);
        options.text.value = String::new();
        let mut surface = PixmapSurface::new(1, 1);
        Renderer::new(StubLoader).render(&options, &mut surface);

        assert_eq!(surface.size(), (20, 10));
        // The 1px line centered on x = 0.5 covers column 0 exactly.
        assert_eq!(surface.pixel(0, 5), Some([0, 255, 0, 255]));
        assert_eq!(surface.pixel(19, 5), Some([0, 255, 0, 255]));
        assert_eq!(surface.pixel(10, 9), Some([0, 255, 0, 255]));
        // Interior below the gloss stays black.
        assert_eq!(surface.pixel(10, 7), Some([0, 0, 0, 255]));
    }

    #[test]
    fn text_is_painted_over_the_border() {
        let font = crate::font::test_font();
        let (w, h, size, baseline) = (48u32, 40u32, 32.0, 34.0);

        // Shift the caption so its first fully inked column lands on x = 0.
        let unshifted = font.coverage("H", size, 0.0, baseline, w, h);
        let first_full = (0..w as usize)
            .find(|&x| (0..h as usize).any(|y| unshifted[y * w as usize + x] == 255))
            .expect("H has a solid stem");

        let mut options = plain_options();
        options.width = w;
        options.height = h;
        options.border.color = Rgba::opaque(0, 255, 0);
        options.border.width = 6.0;
        options.text.value = "H".into();
        options.text.size = size;
        options.text.color = Rgba::opaque(255, 0, 0);
        options.text.x = -(first_full as f32);
        options.text.y = baseline;
        options.text.stroke = None;

        let mut surface = PixmapSurface::new(1, 1).with_font(crate::font::test_font());
        Renderer::new(StubLoader).render(&options, &mut surface);

        let mask = font.coverage("H", size, options.text.x, baseline, w, h);
        let mut overlapping = 0;
        for y in 0..h {
            for x in 0..3 {
                if mask[(y * w + x) as usize] == 255 {
                    assert_eq!(surface.pixel(x, y), Some([255, 0, 0, 255]), "at ({x}, {y})");
                    overlapping += 1;
                }
            }
        }
        assert!(overlapping > 0, "caption never crossed the border");
        // Border rows above the caption keep the border color.
        assert_eq!(surface.pixel(1, 5), Some([0, 255, 0, 255]));
    }

    #[test]
    fn document_render_rejects_bad_shapes() {
        let mut surface = RecordingSurface::default();
        let err = Renderer::new(StubLoader)
            .render_document(&serde_json::json!({"width": "wide"}), &mut surface)
            .unwrap_err();
        assert!(matches!(err, Error::Options(_)));
        assert!(surface.calls.is_empty());
    }
}
