//! RGBA color record and the hex/CSS color codec.
//!
//! Colors in the configuration document are `{ r, g, b, a }` objects with
//! 0-255 channels and a 0-1 alpha. Hex strings carry no alpha, so converting
//! RGBA to hex and back is lossy in the alpha channel: [`hex_to_rgba`] takes
//! the alpha to restore explicitly.

use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A color string that is neither a hex code nor a known color name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color `{0}`")]
pub struct ParseColorError(pub String);

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in the 0-1 range.
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// Creates a color; `a` is clamped to 0-1.
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        let a = if a.is_nan() { 1.0 } else { a.clamp(0.0, 1.0) };
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same RGB with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Channels as bytes, alpha scaled to 0-255.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, (self.a * 255.0).round() as u8]
    }

    /// Reads a color out of a document value, accepting every form the
    /// deserializer accepts.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    /// Parses `#rgb`, `#rrggbb`, `transparent` or a CSS color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            return hex_to_rgba(trimmed, 1.0);
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower == "transparent" {
            return Ok(Self::TRANSPARENT);
        }
        palette::named::from_str(&lower)
            .map(|c| Self::opaque(c.red, c.green, c.blue))
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

/// Wire forms a color may take in the document.
#[derive(Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
enum ColorRepr {
    Components {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default)]
        a: Option<f64>,
    },
    Css(String),
}

impl TryFrom<ColorRepr> for Rgba {
    type Error = ParseColorError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Components { r, g, b, a } => Ok(Self::new(
                channel(r),
                channel(g),
                channel(b),
                a.map(normalize_alpha).unwrap_or(1.0),
            )),
            ColorRepr::Css(s) => s.parse(),
        }
    }
}

fn channel(c: f64) -> u8 {
    if c.is_finite() {
        c.round().clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

/// Maps an authored alpha onto 0-1.
///
/// Values above 1 are read as the legacy 0-255 scale.
pub fn normalize_alpha(a: f64) -> f32 {
    if !a.is_finite() {
        return 1.0;
    }
    let a = if a > 1.0 { a / 255.0 } else { a };
    a.clamp(0.0, 1.0) as f32
}

/// Formats the RGB channels as `#rrggbb`. Alpha is dropped.
pub fn rgba_to_hex(color: Rgba) -> String {
    format!("#{:x}", Srgb::new(color.r, color.g, color.b))
}

/// Parses `#rgb` or `#rrggbb` into a color with the given alpha.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> Result<Rgba, ParseColorError> {
    let digits = hex.trim();
    if !digits.starts_with('#') {
        return Err(ParseColorError(hex.to_string()));
    }
    let rgb = Srgb::<u8>::from_str(digits).map_err(|_| ParseColorError(hex.to_string()))?;
    Ok(Rgba::new(rgb.red, rgb.green, rgb.blue, alpha))
}

/// Hex shown by a color control for whatever sits at its path.
///
/// Absent or unreadable values display as black.
pub fn display_hex(value: Option<&Value>) -> String {
    value
        .and_then(Rgba::from_value)
        .map(rgba_to_hex)
        .unwrap_or_else(|| "#000000".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_round_trip_resets_alpha() {
        let colors = [
            Rgba::opaque(255, 0, 0),
            Rgba::opaque(18, 52, 86),
            Rgba::new(1, 2, 3, 0.25),
        ];
        for color in colors {
            let back = hex_to_rgba(&rgba_to_hex(color), 1.0).unwrap();
            assert_eq!(back, color.with_alpha(1.0));
        }
    }

    #[test]
    fn short_hex_expands() {
        assert_eq!(hex_to_rgba("#f80", 0.5).unwrap(), Rgba::new(255, 136, 0, 0.5));
    }

    #[test]
    fn rejects_garbage_hex() {
        assert!(hex_to_rgba("#12", 1.0).is_err());
        assert!(hex_to_rgba("#gggggg", 1.0).is_err());
        assert!(hex_to_rgba("ff0000", 1.0).is_err());
    }

    #[test]
    fn formats_lowercase_six_digits() {
        assert_eq!(rgba_to_hex(Rgba::opaque(10, 171, 255)), "#0aabff");
    }

    #[test]
    fn legacy_alpha_is_normalized() {
        let c: Rgba = serde_json::from_value(json!({"r": 0, "g": 0, "b": 0, "a": 255})).unwrap();
        assert_eq!(c.a, 1.0);
        let c: Rgba = serde_json::from_value(json!({"r": 0, "g": 0, "b": 0, "a": 40})).unwrap();
        assert!((c.a - 40.0 / 255.0).abs() < 1e-6);
        let c: Rgba = serde_json::from_value(json!({"r": 0, "g": 0, "b": 0, "a": 0.5})).unwrap();
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn missing_alpha_is_opaque() {
        let c: Rgba = serde_json::from_value(json!({"r": 9, "g": 8, "b": 7})).unwrap();
        assert_eq!(c, Rgba::opaque(9, 8, 7));
    }

    #[test]
    fn named_colors_deserialize() {
        let c: Rgba = serde_json::from_value(json!("black")).unwrap();
        assert_eq!(c, Rgba::BLACK);
        let c: Rgba = serde_json::from_value(json!("Red")).unwrap();
        assert_eq!(c, Rgba::opaque(255, 0, 0));
        assert!(serde_json::from_value::<Rgba>(json!("not-a-color")).is_err());
    }

    #[test]
    fn display_hex_defaults_to_black() {
        assert_eq!(display_hex(None), "#000000");
        assert_eq!(display_hex(Some(&Value::Null)), "#000000");
        assert_eq!(display_hex(Some(&json!({"r": 255, "g": 255, "b": 255, "a": 1}))), "#ffffff");
    }
}
