//! userbar-renderer: customizable banner ("userbar") images
//!
//! This crate draws small fixed-size banners (gradient, stripes, background
//! image, icon, gloss, border and outlined text) and provides a headless,
//! path-addressed editor for the configuration document they are drawn from.
//!
//! # Example
//!
//! ```
//! use userbar_renderer::{PixmapSurface, Renderer, SourceLoader, Surface, UserbarOptions};
//!
//! let mut options = UserbarOptions::default();
//! options.text.value = "rust".to_string();
//!
//! let mut surface = PixmapSurface::new(1, 1);
//! Renderer::new(SourceLoader::new()).render(&options, &mut surface);
//! assert_eq!(surface.size(), (350, 19));
//!
//! let png = surface.encode_png().unwrap();
//! assert!(!png.is_empty());
//! ```
//!
//! # Editing
//!
//! [`ConfigEditor`] owns the JSON document, exposes one [`FieldBinding`] per
//! editable path and fires a notifier after every change:
//!
//! ```
//! use serde_json::json;
//! use userbar_renderer::{ConfigEditor, PixmapSurface, RawInput, Renderer, SourceLoader};
//!
//! let mut editor = ConfigEditor::with_defaults(|_doc| {}).unwrap();
//! editor.input("border.color", RawInput::Text("#00ff00".into())).unwrap();
//! editor.update_option("gradientDirection", json!("to-bottom"));
//!
//! let mut surface = PixmapSurface::new(1, 1);
//! Renderer::new(SourceLoader::new()).render_document(editor.document(), &mut surface).unwrap();
//! ```
//!
//! Text needs a font: register one with [`PixmapSurface::with_font`], e.g.
//! from [`FontAsset::from_env_or_system`]. Without one, text is skipped.

pub mod color;
pub mod editor;
pub mod export;
pub mod font;
pub mod options;
pub mod path;
pub mod render;
pub mod source;

mod error;

pub use color::{ParseColorError, Rgba};
pub use editor::{
    ConfigEditor, Container, ControlValue, FieldBinding, FieldKind, GradientListEditor, RawInput,
    Section, SectionItem, SectionToggle,
};
pub use error::{Error, Result};
pub use export::{DirectoryExport, ExportTarget, file_name};
pub use font::FontAsset;
pub use options::{
    BackgroundImage, Border, Crosshatch, DiagonalStripes, GradientDirection, GradientStop,
    GradientType, IconOptions, TextOptions, TextStroke, UserbarOptions,
};
pub use path::ConfigPath;
pub use render::Renderer;
pub use render::pixmap::PixmapSurface;
pub use render::surface::{Fill, FontSpec, Gradient, GradientShape, RectF, Surface};
pub use source::{CachedLoader, DecodedImage, FileImporter, FsImporter, ImageLoader, SourceLoader};
