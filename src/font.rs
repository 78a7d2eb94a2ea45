//! Font assets for text drawing, rasterized with fontdue (pure Rust).
//!
//! Fonts are loaded once, before any drawing, and handed to the surface.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Family name the renderer asks for.
pub const DEFAULT_FAMILY: &str = "Visitor";

/// Environment variable pointing at a font file to use instead of the
/// system fallbacks.
pub const FONT_ENV_VAR: &str = "USERBAR_FONT";

const SYSTEM_FONT_PATHS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// A parsed font registered under a family name.
pub struct FontAsset {
    family: String,
    font: Font,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl FontAsset {
    /// Parses TrueType/OpenType bytes.
    pub fn from_bytes(family: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self {
            family: family.into(),
            font,
        })
    }

    /// Loads a font file.
    pub fn from_path(family: impl Into<String>, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        let asset = Self::from_bytes(family, bytes)?;
        info!(family = %asset.family, path = %path.display(), "loaded font");
        Ok(asset)
    }

    /// Loads the file named by `USERBAR_FONT`, else the first common system
    /// font found, registering it under `family`.
    pub fn from_env_or_system(family: &str) -> Result<Self> {
        if let Some(path) = std::env::var_os(FONT_ENV_VAR) {
            let path = PathBuf::from(path);
            match Self::from_path(family, &path) {
                Ok(asset) => return Ok(asset),
                Err(e) => warn!(path = %path.display(), error = %e, "font from environment unusable"),
            }
        }

        for path in SYSTEM_FONT_PATHS {
            if let Ok(asset) = Self::from_path(family, Path::new(path)) {
                return Ok(asset);
            }
        }

        Err(Error::Font(format!(
            "no usable font; set {FONT_ENV_VAR} or install one of {SYSTEM_FONT_PATHS:?}"
        )))
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Horizontal advance of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        self.layout(text, size).last().map_or(0.0, |g| g.pen_x + g.advance)
    }

    /// Coverage mask of `text` on a `width`×`height` canvas, with the pen
    /// starting at `x` and the alphabetic baseline at `baseline`.
    ///
    /// Glyph pixels falling outside the canvas are clipped.
    pub fn coverage(
        &self,
        text: &str,
        size: f32,
        x: f32,
        baseline: f32,
        width: u32,
        height: u32,
    ) -> Vec<u8> {
        let (w, h) = (width as i32, height as i32);
        let mut mask = vec![0u8; (width as usize) * (height as usize)];

        for glyph in self.layout(text, size) {
            let (metrics, bitmap) = self.font.rasterize(glyph.ch, size);
            let left = (x + glyph.pen_x).round() as i32 + metrics.xmin;
            let top = baseline.round() as i32 - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                let py = top + gy as i32;
                if py < 0 || py >= h {
                    continue;
                }
                for gx in 0..metrics.width {
                    let px = left + gx as i32;
                    if px < 0 || px >= w {
                        continue;
                    }
                    let cov = bitmap[gy * metrics.width + gx];
                    let slot = &mut mask[py as usize * width as usize + px as usize];
                    *slot = (*slot).max(cov);
                }
            }
        }
        mask
    }

    fn layout(&self, text: &str, size: f32) -> Vec<PlacedGlyph> {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen_x = 0.0f32;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if let Some(left) = prev {
                pen_x += self.font.horizontal_kern(left, ch, size).unwrap_or(0.0);
            }
            let advance = self.font.metrics(ch, size).advance_width;
            glyphs.push(PlacedGlyph { ch, pen_x, advance });
            pen_x += advance;
            prev = Some(ch);
        }
        glyphs
    }
}

struct PlacedGlyph {
    ch: char,
    pen_x: f32,
    advance: f32,
}

/// Public-domain Tuffy Regular, bundled for deterministic text tests.
#[cfg(test)]
pub(crate) fn test_font() -> FontAsset {
    const TUFFY: &[u8] = include_bytes!("../tests/fixtures/Tuffy.ttf");
    FontAsset::from_bytes(DEFAULT_FAMILY, TUFFY.to_vec()).expect("bundled font parses")
}
