//! Controls bound to a single document path.

use std::path::PathBuf;

use serde_json::{Number, Value};

use crate::color::{Rgba, display_hex, hex_to_rgba};
use crate::error::{Error, Result};
use crate::path::ConfigPath;
use crate::source::{FileImporter, describe_source};

// ============================================================================
// Kinds and values
// ============================================================================

/// What a control edits and how its raw input converts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free numeric entry. Bounds are inclusive; `step` is a UI hint.
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        integer: bool,
    },
    /// Slider between `min` and `max`.
    Range { min: f64, max: f64, step: f64 },
    Text,
    /// Checkbox.
    Boolean,
    /// Hex color picker. Edits keep the stored alpha.
    Color,
    /// File picker; the chosen file is stored as a data URL.
    File { accept: String },
    /// Drop-down limited to `options`.
    Select { options: Vec<String> },
}

impl FieldKind {
    /// Whole number within `min..=max`.
    pub fn integer(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
            step: None,
            integer: true,
        }
    }

    /// Any finite number.
    pub fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
            step: None,
            integer: false,
        }
    }

    /// Any finite number at or above `min`.
    pub fn number_from(min: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: None,
            step: None,
            integer: false,
        }
    }

    /// One of a fixed set of strings.
    pub fn select<S: AsRef<str>>(options: &[S]) -> Self {
        Self::Select {
            options: options.iter().map(|o| o.as_ref().to_string()).collect(),
        }
    }
}

/// Raw input as a host UI reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// The control's string value (text, number, range, color, select).
    Text(String),
    /// A checkbox state.
    Checked(bool),
    /// A file selection; `None` when the picker was cleared.
    File(Option<PathBuf>),
}

/// What a control currently displays.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Number(Option<f64>),
    Text(String),
    Checked(bool),
    /// `#rrggbb`.
    Color(String),
    /// The "current" label shown next to a file picker.
    File(Option<String>),
}

// ============================================================================
// FieldBinding
// ============================================================================

/// One labelled control bound to a document path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    label: String,
    kind: FieldKind,
    path: ConfigPath,
    display: ControlValue,
}

impl FieldBinding {
    /// Creates a control showing whatever `root` holds at `path`.
    pub fn new(label: impl Into<String>, kind: FieldKind, path: impl Into<ConfigPath>, root: &Value) -> Self {
        let path = path.into();
        let display = display_for(&kind, path.get(root));
        Self {
            label: label.into(),
            kind,
            path,
            display,
        }
    }

    /// Text shown next to the control.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Control type and its validation rules.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Document location this control reads and writes.
    pub fn path(&self) -> &ConfigPath {
        &self.path
    }

    /// Value the control currently shows.
    pub fn display(&self) -> &ControlValue {
        &self.display
    }

    /// Shows `value` without going through the input path.
    pub fn reflect(&mut self, value: Option<&Value>) {
        self.display = display_for(&self.kind, value);
    }

    /// Re-reads the bound value from `root`.
    pub fn refresh(&mut self, root: &Value) {
        self.reflect(self.path.get(root));
    }

    /// Converts `raw`, stores it at the bound path and reflects it.
    ///
    /// Input that does not convert leaves `root` untouched.
    pub fn apply(&mut self, raw: RawInput, root: &mut Value, importer: &dyn FileImporter) -> Result<()> {
        let value = self.convert(raw, root, importer)?;
        self.path.set(root, value);
        self.refresh(root);
        Ok(())
    }

    fn convert(&self, raw: RawInput, root: &Value, importer: &dyn FileImporter) -> Result<Value> {
        match (&self.kind, raw) {
            (FieldKind::Number { min, max, integer, .. }, RawInput::Text(text)) => {
                let n = self.parse_number(&text)?;
                self.check_bounds(n, *min, *max)?;
                if *integer && n.fract() != 0.0 {
                    return Err(self.invalid(format!("{n} is not a whole number")));
                }
                Ok(number_value(n))
            }
            (FieldKind::Range { min, max, .. }, RawInput::Text(text)) => {
                let n = self.parse_number(&text)?;
                self.check_bounds(n, Some(*min), Some(*max))?;
                Ok(number_value(n))
            }
            (FieldKind::Text, RawInput::Text(text)) => Ok(Value::String(text)),
            (FieldKind::Boolean, RawInput::Checked(checked)) => Ok(Value::Bool(checked)),
            (FieldKind::Color, RawInput::Text(hex)) => {
                let alpha = self
                    .path
                    .get(root)
                    .and_then(Rgba::from_value)
                    .map_or(1.0, |c| c.a);
                let color = hex_to_rgba(&hex, alpha).map_err(|e| self.invalid(e.to_string()))?;
                Ok(serde_json::to_value(color)?)
            }
            (FieldKind::Select { options }, RawInput::Text(choice)) => {
                if options.iter().any(|o| *o == choice) {
                    Ok(Value::String(choice))
                } else {
                    Err(self.invalid(format!("`{choice}` is not one of {options:?}")))
                }
            }
            (FieldKind::File { .. }, RawInput::File(None)) => Ok(Value::String(String::new())),
            (FieldKind::File { .. }, RawInput::File(Some(path))) => {
                Ok(Value::String(importer.read_as_data_url(&path)?))
            }
            (kind, raw) => Err(self.invalid(format!("{raw:?} does not fit a {} control", kind_name(kind)))),
        }
    }

    fn parse_number(&self, text: &str) -> Result<f64> {
        let n: f64 = text
            .trim()
            .parse()
            .map_err(|_| self.invalid(format!("`{text}` is not a number")))?;
        if !n.is_finite() {
            return Err(self.invalid(format!("`{text}` is not finite")));
        }
        Ok(n)
    }

    fn check_bounds(&self, n: f64, min: Option<f64>, max: Option<f64>) -> Result<()> {
        if let Some(min) = min.filter(|m| n < *m) {
            return Err(self.invalid(format!("{n} is below the minimum {min}")));
        }
        if let Some(max) = max.filter(|m| n > *m) {
            return Err(self.invalid(format!("{n} is above the maximum {max}")));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::invalid_input(self.path.to_string(), reason)
    }
}

fn kind_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Number { .. } => "number",
        FieldKind::Range { .. } => "range",
        FieldKind::Text => "text",
        FieldKind::Boolean => "checkbox",
        FieldKind::Color => "color",
        FieldKind::File { .. } => "file",
        FieldKind::Select { .. } => "select",
    }
}

fn display_for(kind: &FieldKind, value: Option<&Value>) -> ControlValue {
    match kind {
        FieldKind::Number { .. } | FieldKind::Range { .. } => {
            ControlValue::Number(value.and_then(Value::as_f64))
        }
        FieldKind::Text | FieldKind::Select { .. } => ControlValue::Text(match value {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        }),
        FieldKind::Boolean => ControlValue::Checked(value.and_then(Value::as_bool).unwrap_or(false)),
        FieldKind::Color => ControlValue::Color(display_hex(value)),
        FieldKind::File { .. } => {
            ControlValue::File(value.and_then(Value::as_str).and_then(describe_source))
        }
    }
}

/// Whole numbers become JSON integers so integer fields deserialize cleanly.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
