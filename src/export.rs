//! Delivering finished userbars as PNG files.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::options::UserbarOptions;
use crate::render::pixmap::PixmapSurface;

/// Download name for a banner captioned `text`: `ub-<text>.png`, trimmed,
/// with every whitespace run collapsed to `_`.
pub fn file_name(text: &str) -> String {
    let stem = text.split_whitespace().collect::<Vec<_>>().join("_");
    format!("ub-{stem}.png")
}

/// Where encoded images go.
pub trait ExportTarget {
    /// Stores `bytes` under `name`, returning where they ended up.
    fn deliver(&self, name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes exports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectoryExport {
    dir: PathBuf,
}

impl DirectoryExport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportTarget for DirectoryExport {
    fn deliver(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let io_err = |source| Error::Export {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(&path, bytes).map_err(io_err)?;
        info!(path = %path.display(), bytes = bytes.len(), "exported userbar");
        Ok(path)
    }
}

/// Encodes `surface` and delivers it under the name derived from the
/// banner text.
pub fn export_png<T: ExportTarget + ?Sized>(
    surface: &PixmapSurface,
    options: &UserbarOptions,
    target: &T,
) -> Result<PathBuf> {
    let png = surface.encode_png()?;
    target.deliver(&file_name(&options.text.value), &png)
}
