//! Typed userbar configuration.
//!
//! [`UserbarOptions`] is the typed view of the configuration document the
//! editor works on. It serializes to camelCase JSON so the document and the
//! typed snapshot share one shape:
//!
//! ```
//! use userbar_renderer::UserbarOptions;
//!
//! let options = UserbarOptions::default();
//! let json = options.to_json().unwrap();
//! assert!(json.contains("\"diagStripesV2\""));
//!
//! let restored = UserbarOptions::from_json(&json).unwrap();
//! assert_eq!(restored.width, 350);
//! ```
//!
//! Optional sub-trees (`diagStripes`, `diagStripesV2`, `text.stroke`,
//! `backgroundImage`, `icon`) are either `null` or fully populated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Rgba;

// ============================================================================
// Sections
// ============================================================================

/// Outline drawn around the banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Border {
    pub color: Rgba,
    /// Line width in pixels. Zero disables the border.
    pub width: f32,
}

/// One-directional diagonal stripes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct DiagonalStripes {
    pub color: Rgba,
    /// Distance between stripes along each row.
    pub spacing: u32,
    /// Stripes follow `x - y` instead of `x + y`.
    #[serde(default)]
    pub on_main_diagonal: bool,
}

/// Stripes in both diagonal directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Crosshatch {
    pub color: Rgba,
    pub spacing: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct TextStroke {
    pub width: f32,
    pub color: Rgba,
}

/// Banner caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct TextOptions {
    pub value: String,
    /// Font size in pixels.
    pub size: f32,
    pub color: Rgba,
    /// Left edge of the text.
    pub x: f32,
    /// Alphabetic baseline of the text.
    pub y: f32,
    #[serde(default)]
    pub stroke: Option<TextStroke>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum GradientType {
    #[default]
    Linear,
    /// Anything that is not `linear` renders radially.
    #[serde(other)]
    Radial,
}

impl GradientType {
    pub const NAMES: [&'static str; 2] = ["linear", "radial"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum GradientDirection {
    #[default]
    ToRight,
    ToLeft,
    ToTop,
    ToBottom,
    /// Unrecognized directions render left to right.
    #[serde(other)]
    Unknown,
}

impl GradientDirection {
    pub const NAMES: [&'static str; 4] = ["to-right", "to-left", "to-top", "to-bottom"];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct GradientStop {
    /// Offset along the gradient, expected in 0-1.
    pub position: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(position: f32, color: Rgba) -> Self {
        Self { position, color }
    }
}

/// Image drawn behind the overlay and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct BackgroundImage {
    /// Data URL or file path. Null or empty draws nothing.
    #[serde(default)]
    pub src: Option<String>,
    /// Zero means the image's natural width.
    #[serde(default)]
    pub width: f32,
    /// Zero means the image's natural height.
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Small rotated logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct IconOptions {
    #[serde(default)]
    pub src: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation about the icon center, in degrees.
    #[serde(default)]
    pub angle: f32,
}

// ============================================================================
// UserbarOptions
// ============================================================================

/// Everything needed to draw one userbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct UserbarOptions {
    pub width: u32,
    pub height: u32,
    pub border: Border,
    #[serde(default)]
    pub diag_stripes: Option<DiagonalStripes>,
    #[serde(default, rename = "diagStripesV2")]
    pub diag_stripes_v2: Option<Crosshatch>,
    pub text: TextOptions,
    #[serde(default)]
    pub gradient_type: GradientType,
    #[serde(default)]
    pub gradients: Vec<GradientStop>,
    #[serde(default)]
    pub gradient_direction: GradientDirection,
    #[serde(default)]
    pub background_image: Option<BackgroundImage>,
    #[serde(default)]
    pub icon: Option<IconOptions>,
}

impl Default for UserbarOptions {
    fn default() -> Self {
        Self {
            width: 350,
            height: 19,
            border: Border {
                color: Rgba::opaque(255, 0, 0),
                width: 1.0,
            },
            diag_stripes: Some(default_diag_stripes()),
            diag_stripes_v2: Some(default_crosshatch()),
            text: TextOptions {
                value: "hello world".to_string(),
                size: 10.0,
                color: Rgba::WHITE,
                x: 275.0,
                y: 12.0,
                stroke: Some(TextStroke {
                    width: 2.5,
                    color: Rgba::BLACK,
                }),
            },
            gradient_type: GradientType::Linear,
            gradients: Vec::new(),
            gradient_direction: GradientDirection::ToRight,
            background_image: Some(BackgroundImage {
                src: None,
                width: 350.0,
                height: 0.0,
                x: 0.0,
                y: -220.0,
            }),
            icon: Some(IconOptions {
                src: None,
                x: 10.0,
                y: 0.0,
                width: 20.0,
                height: 20.0,
                angle: 0.0,
            }),
        }
    }
}

impl UserbarOptions {
    /// Serializes the options to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the options to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds the editable document form of these options.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Reads a typed snapshot out of a configuration document.
    pub fn from_document(document: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(document)
    }

    /// Gradient stops ordered by position, ties kept in authored order.
    pub fn sorted_gradients(&self) -> Vec<GradientStop> {
        let mut stops = self.gradients.clone();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        stops
    }
}

// ============================================================================
// Section defaults
// ============================================================================

/// Stripes injected when the "Background lines" section is enabled.
pub fn default_diag_stripes() -> DiagonalStripes {
    DiagonalStripes {
        color: Rgba::BLACK,
        spacing: 20,
        on_main_diagonal: false,
    }
}

/// Crosshatch injected when the "Background grid" section is enabled.
pub fn default_crosshatch() -> Crosshatch {
    Crosshatch {
        color: Rgba::new(0, 0, 0, 40.0 / 255.0),
        spacing: 4,
    }
}

/// Stop appended by "Add New Gradient Stop".
pub fn default_gradient_stop() -> GradientStop {
    GradientStop::new(0.5, Rgba::opaque(128, 128, 128))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_serialize_camel_case() {
        let doc = UserbarOptions::default().to_document().unwrap();
        assert_eq!(doc["width"], json!(350));
        assert_eq!(doc["diagStripes"]["onMainDiagonal"], json!(false));
        assert_eq!(doc["diagStripesV2"]["spacing"], json!(4));
        assert_eq!(doc["gradientDirection"], json!("to-right"));
        assert_eq!(doc["gradientType"], json!("linear"));
        assert_eq!(doc["backgroundImage"]["src"], Value::Null);
        assert_eq!(doc["text"]["stroke"]["width"], json!(2.5));
    }

    #[test]
    fn document_round_trip() {
        let options = UserbarOptions::default();
        let doc = options.to_document().unwrap();
        assert_eq!(UserbarOptions::from_document(&doc).unwrap(), options);
    }

    #[test]
    fn null_sections_deserialize_as_none() {
        let mut doc = UserbarOptions::default().to_document().unwrap();
        doc["diagStripes"] = Value::Null;
        doc["text"]["stroke"] = Value::Null;
        doc.as_object_mut().unwrap().remove("icon");
        let options = UserbarOptions::from_document(&doc).unwrap();
        assert!(options.diag_stripes.is_none());
        assert!(options.text.stroke.is_none());
        assert!(options.icon.is_none());
    }

    #[test]
    fn unknown_enum_values_fall_back() {
        let mut doc = UserbarOptions::default().to_document().unwrap();
        doc["gradientDirection"] = json!("diagonal");
        doc["gradientType"] = json!("conic");
        let options = UserbarOptions::from_document(&doc).unwrap();
        assert_eq!(options.gradient_direction, GradientDirection::Unknown);
        assert_eq!(options.gradient_type, GradientType::Radial);
    }

    #[test]
    fn named_stroke_color_is_accepted() {
        let mut doc = UserbarOptions::default().to_document().unwrap();
        doc["text"]["stroke"] = json!({"width": 1, "color": "black"});
        let options = UserbarOptions::from_document(&doc).unwrap();
        assert_eq!(options.text.stroke.unwrap().color, Rgba::BLACK);
    }

    #[test]
    fn gradients_sort_stably_by_position() {
        let mut options = UserbarOptions::default();
        options.gradients = vec![
            GradientStop::new(0.8, Rgba::opaque(1, 0, 0)),
            GradientStop::new(0.2, Rgba::opaque(2, 0, 0)),
            GradientStop::new(0.5, Rgba::opaque(3, 0, 0)),
            GradientStop::new(0.2, Rgba::opaque(4, 0, 0)),
        ];
        let sorted: Vec<(f32, u8)> = options
            .sorted_gradients()
            .iter()
            .map(|s| (s.position, s.color.r))
            .collect();
        assert_eq!(sorted, vec![(0.2, 2), (0.2, 4), (0.5, 3), (0.8, 1)]);
        // The authored order is untouched.
        assert_eq!(options.gradients[0].position, 0.8);
    }
}
