//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while editing, decoding, rendering or exporting a userbar.
#[derive(Debug, Error)]
pub enum Error {
    /// A control received input that does not convert to its field's type.
    #[error("invalid input for `{path}`: {reason}")]
    InvalidInput { path: String, reason: String },

    /// No control is bound to the given path.
    #[error("no field is bound to `{0}`")]
    UnknownField(String),

    /// No editor section carries the given title.
    #[error("no section titled `{0}`")]
    UnknownSection(String),

    /// A gradient stop index outside the current list.
    #[error("gradient stop {index} does not exist (list has {len} stops)")]
    StopOutOfRange { index: usize, len: usize },

    /// The configuration document does not match the userbar data model.
    #[error("invalid userbar options: {0}")]
    Options(#[from] serde_json::Error),

    /// An image source could not be turned into pixels.
    #[error("failed to decode image `{source_name}`: {reason}")]
    Decode { source_name: String, reason: String },

    /// A file could not be read for import.
    #[error("failed to read `{}`", path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A font asset could not be loaded.
    #[error("failed to load font: {0}")]
    Font(String),

    /// The finished surface could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// The encoded image could not be delivered.
    #[error("failed to write `{}`", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn invalid_input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(source_name: &str, reason: impl ToString) -> Self {
        Self::Decode {
            source_name: abbreviate(source_name),
            reason: reason.to_string(),
        }
    }
}

/// Data URLs can be megabytes long; keep error messages readable.
fn abbreviate(source: &str) -> String {
    const MAX: usize = 64;
    match source.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &source[..idx]),
        None => source.to_string(),
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_abbreviates_long_sources() {
        let src = format!("data:image/png;base64,{}", "A".repeat(500));
        let err = Error::decode(&src, "bad header");
        let msg = err.to_string();
        assert!(msg.len() < 150);
        assert!(msg.contains("..."));
        assert!(msg.ends_with("bad header"));
    }
}
