//! Enable/disable switch for an optional sub-tree.

use serde_json::Value;

use crate::path::ConfigPath;

pub const ENABLE_LABEL: &str = "ENABLE";
pub const DISABLE_LABEL: &str = "DISABLE";

/// Switches the sub-tree at `path` between `null` and a fresh default.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionToggle {
    path: ConfigPath,
    default: Value,
}

impl SectionToggle {
    /// Toggles the sub-tree at `path`, enabling it with `default`.
    pub fn new(path: impl Into<ConfigPath>, default: Value) -> Self {
        Self {
            path: path.into(),
            default,
        }
    }

    /// Location of the toggled sub-tree.
    pub fn path(&self) -> &ConfigPath {
        &self.path
    }

    /// The value injected on enable.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Enabled while the sub-tree is present and not null.
    pub fn is_enabled(&self, root: &Value) -> bool {
        self.path.get(root).is_some_and(|v| !v.is_null())
    }

    /// Button text for the current state.
    pub fn label(&self, root: &Value) -> &'static str {
        if self.is_enabled(root) {
            DISABLE_LABEL
        } else {
            ENABLE_LABEL
        }
    }

    /// Flips the sub-tree and returns whether it is now enabled.
    pub fn toggle(&self, root: &mut Value) -> bool {
        if self.is_enabled(root) {
            self.path.set(root, Value::Null);
            false
        } else {
            self.path.set(root, self.default.clone());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stroke_toggle() -> SectionToggle {
        SectionToggle::new("text.stroke", json!({ "width": 1, "color": "black" }))
    }

    #[test]
    fn absent_and_null_are_disabled() {
        let toggle = stroke_toggle();
        assert!(!toggle.is_enabled(&json!({})));
        assert!(!toggle.is_enabled(&json!({ "text": { "stroke": null } })));
        assert!(toggle.is_enabled(&json!({ "text": { "stroke": {} } })));
        assert_eq!(toggle.label(&json!({})), ENABLE_LABEL);
    }

    #[test]
    fn disable_enable_disable_ends_null() {
        let toggle = stroke_toggle();
        let mut root = json!({ "text": { "stroke": { "width": 3, "color": "red" } } });

        assert!(!toggle.toggle(&mut root));
        assert_eq!(root["text"]["stroke"], Value::Null);
        assert!(toggle.toggle(&mut root));
        assert_eq!(toggle.label(&root), DISABLE_LABEL);
        assert!(!toggle.toggle(&mut root));
        assert_eq!(root["text"].get("stroke"), Some(&Value::Null));
    }

    #[test]
    fn enable_applies_pristine_default() {
        let toggle = stroke_toggle();
        let mut root = json!({});
        toggle.toggle(&mut root);
        root["text"]["stroke"]["width"] = json!(9);
        toggle.toggle(&mut root);
        toggle.toggle(&mut root);
        assert_eq!(root["text"]["stroke"], json!({ "width": 1, "color": "black" }));
        assert_eq!(&root["text"]["stroke"], toggle.default_value());
    }

    #[test]
    fn exposes_path_and_default() {
        let toggle = stroke_toggle();
        assert_eq!(toggle.path().to_string(), "text.stroke");
        assert_eq!(toggle.default_value()["width"], json!(1));
    }
}
