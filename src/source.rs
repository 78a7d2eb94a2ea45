//! Image decoding and file import capabilities.
//!
//! Background images and icons are referenced by a source string: either a
//! `data:` URL (what the file import produces) or a filesystem path. The
//! renderer never touches bytes itself; it goes through [`ImageLoader`].
//! File controls in the editor go through [`FileImporter`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{Rgba as Pixel, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use tracing::debug;

use crate::error::{Error, Result};

const SVG_MIME: &str = "image/svg+xml";

// ============================================================================
// DecodedImage
// ============================================================================

/// Pixels of a decoded source, straight alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Turns a source string into pixels.
pub trait ImageLoader {
    fn load(&self, src: &str) -> Result<DecodedImage>;
}

/// Turns a user-selected file into a data URL.
pub trait FileImporter {
    fn read_as_data_url(&self, path: &Path) -> Result<String>;
}

impl<T: ImageLoader + ?Sized> ImageLoader for &T {
    fn load(&self, src: &str) -> Result<DecodedImage> {
        (**self).load(src)
    }
}

// ============================================================================
// SourceLoader
// ============================================================================

/// Decodes data URLs and files: rasters through `image`, SVG through resvg.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    /// Directory relative paths are resolved against.
    base_dir: Option<PathBuf>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageLoader for SourceLoader {
    fn load(&self, src: &str) -> Result<DecodedImage> {
        if src.starts_with("data:") {
            let (mime, bytes) = parse_data_url(src)?;
            debug!(mime = %mime, bytes = bytes.len(), "decoding data URL");
            return decode_bytes(src, &mime, &bytes);
        }

        let path = self.resolve(src);
        debug!(path = %path.display(), "decoding image file");
        let bytes = std::fs::read(&path).map_err(|e| Error::decode(src, e))?;
        decode_bytes(src, mime_for_path(&path), &bytes)
    }
}

fn decode_bytes(src: &str, mime: &str, bytes: &[u8]) -> Result<DecodedImage> {
    if mime == SVG_MIME {
        let svg = std::str::from_utf8(bytes).map_err(|e| Error::decode(src, e))?;
        return render_svg(svg)
            .map(DecodedImage::new)
            .ok_or_else(|| Error::decode(src, "unreadable SVG"));
    }
    let img = image::load_from_memory(bytes).map_err(|e| Error::decode(src, e))?;
    Ok(DecodedImage::new(img.to_rgba8()))
}

// ============================================================================
// CachedLoader
// ============================================================================

/// Memoizes another loader by source string. Failures are not cached.
pub struct CachedLoader<L> {
    inner: L,
    cache: RefCell<HashMap<String, DecodedImage>>,
}

impl<L: ImageLoader> CachedLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Drops every cached image.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<L: ImageLoader> ImageLoader for CachedLoader<L> {
    fn load(&self, src: &str) -> Result<DecodedImage> {
        if let Some(hit) = self.cache.borrow().get(src) {
            return Ok(hit.clone());
        }
        let decoded = self.inner.load(src)?;
        self.cache
            .borrow_mut()
            .insert(src.to_string(), decoded.clone());
        Ok(decoded)
    }
}

// ============================================================================
// FsImporter
// ============================================================================

/// Reads files from disk and encodes them as base64 data URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImporter;

impl FileImporter for FsImporter {
    fn read_as_data_url(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|source| Error::Import {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "imported file");
        Ok(encode_data_url(mime_for_path(path), &bytes))
    }
}

// ============================================================================
// Data URLs
// ============================================================================

/// Builds a base64 `data:` URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Splits a `data:` URL into its MIME type and payload bytes.
///
/// Both base64 and percent-free plain payloads are accepted.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::decode(url, "not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::decode(url, "data URL has no payload"))?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("text/plain")
        .to_ascii_lowercase();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::decode(url, e))?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok((mime, bytes))
}

/// MIME type guessed from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        Some("svg") => SVG_MIME,
        _ => "application/octet-stream",
    }
}

/// What a file control shows for its current source.
///
/// Data URLs show as `Data URL`, paths as their final `/` segment; null or
/// empty sources show nothing.
pub fn describe_source(src: &str) -> Option<String> {
    if src.is_empty() {
        None
    } else if src.starts_with("data:") {
        Some("Data URL".to_string())
    } else {
        src.rsplit('/').next().map(str::to_string)
    }
}

// ============================================================================
// SVG decoding
// ============================================================================

/// Renders SVG markup at its intrinsic size.
///
/// Returns `None` if the SVG cannot be parsed or has an empty size.
pub fn render_svg(svg_data: &str) -> Option<RgbaImage> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).ok()?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Some(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny-skia pixmap (premultiplied) to a straight-alpha image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Pixel([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Converts a straight-alpha image to a tiny-skia pixmap.
pub fn rgba_image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = resvg::tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4"><rect width="8" height="4" fill="#00ff00"/></svg>"##;

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Pixel(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let dir = std::env::temp_dir().join(format!("userbar-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tile.png"), png_bytes(2, 5, [0, 0, 255, 255])).unwrap();

        let decoded = SourceLoader::with_base_dir(&dir).load("tile.png").unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 5));
        assert!(SourceLoader::new().load("tile.png").is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn decodes_png_data_url() {
        let url = encode_data_url("image/png", &png_bytes(3, 2, [255, 0, 0, 255]));
        let decoded = SourceLoader::new().load(&url).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(decoded.pixels.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn decodes_svg_data_url_at_natural_size() {
        let url = encode_data_url(SVG_MIME, SIMPLE_SVG.as_bytes());
        let decoded = SourceLoader::new().load(&url).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        assert_eq!(decoded.pixels.get_pixel(4, 2).0, [0, 255, 0, 255]);
    }

    #[test]
    fn corrupt_payload_is_a_decode_error() {
        let url = encode_data_url("image/png", b"definitely not a png");
        assert!(matches!(
            SourceLoader::new().load(&url),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = SourceLoader::new().load("/nonexistent/banner.png").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn parses_data_url_header() {
        let (mime, bytes) = parse_data_url("data:image/svg+xml;charset=utf-8;base64,PHN2Zy8+").unwrap();
        assert_eq!(mime, SVG_MIME);
        assert_eq!(bytes, b"<svg/>");

        let (mime, bytes) = parse_data_url("data:,hello").unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(bytes, b"hello");

        assert!(parse_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn describes_sources() {
        assert_eq!(describe_source("data:image/png;base64,AAAA").as_deref(), Some("Data URL"));
        assert_eq!(describe_source("assets/img/bg.png").as_deref(), Some("bg.png"));
        assert_eq!(describe_source("bg.png").as_deref(), Some("bg.png"));
        assert_eq!(describe_source(""), None);
    }

    #[test]
    fn importer_round_trips_through_loader() {
        let dir = std::env::temp_dir().join(format!("userbar-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("stripe.png");
        std::fs::write(&file, png_bytes(2, 2, [0, 0, 255, 128])).unwrap();

        let url = FsImporter.read_as_data_url(&file).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let decoded = SourceLoader::new().load(&url).unwrap();
        assert_eq!(decoded.pixels.get_pixel(0, 0).0, [0, 0, 255, 128]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn importer_reports_missing_files() {
        let err = FsImporter
            .read_as_data_url(Path::new("/nonexistent/logo.png"))
            .unwrap_err();
        assert!(matches!(err, Error::Import { .. }));
    }

    struct CountingLoader(RefCell<usize>);

    impl ImageLoader for CountingLoader {
        fn load(&self, _src: &str) -> Result<DecodedImage> {
            *self.0.borrow_mut() += 1;
            Ok(DecodedImage::new(RgbaImage::new(1, 1)))
        }
    }

    #[test]
    fn cached_loader_decodes_once_per_source() {
        let loader = CachedLoader::new(CountingLoader(RefCell::new(0)));
        loader.load("a").unwrap();
        loader.load("a").unwrap();
        loader.load("b").unwrap();
        assert_eq!(*loader.inner.0.borrow(), 2);
        assert_eq!(loader.len(), 2);
        loader.clear();
        assert!(loader.is_empty());
    }

    #[test]
    fn pixmap_conversion_round_trips_opaque_pixels() {
        let img = RgbaImage::from_pixel(2, 2, Pixel([10, 20, 30, 255]));
        let pixmap = rgba_image_to_pixmap(&img).unwrap();
        assert_eq!(pixmap_to_rgba_image(&pixmap), img);
    }
}
