//! Editable list of gradient stops.

use serde_json::Value;

use super::field::{FieldBinding, FieldKind};
use crate::error::{Error, Result};
use crate::options::default_gradient_stop;
use crate::path::ConfigPath;

/// Document key holding the stop list.
pub const GRADIENTS_PATH: &str = "gradients";
pub const EMPTY_PLACEHOLDER: &str = "No gradient stops.";
pub const ADD_LABEL: &str = "Add New Gradient Stop";

/// Controls for one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopGroup {
    pub position: FieldBinding,
    pub color: FieldBinding,
    /// `Remove Stop <n>`, one-based.
    pub remove_label: String,
}

impl StopGroup {
    fn new(index: usize, root: &Value) -> Self {
        let base = ConfigPath::parse(GRADIENTS_PATH).index(index);
        Self {
            position: FieldBinding::new(
                "Position",
                FieldKind::Range {
                    min: 0.0,
                    max: 1.0,
                    step: 0.001,
                },
                base.clone().key("position"),
                root,
            ),
            color: FieldBinding::new("Color", FieldKind::Color, base.key("color"), root),
            remove_label: format!("Remove Stop {}", index + 1),
        }
    }
}

/// One [`StopGroup`] per entry of `gradients`, rebuilt after every
/// structural change so each group stays bound to its current index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradientListEditor {
    groups: Vec<StopGroup>,
}

impl GradientListEditor {
    /// Builds groups for the current list, normalizing a missing or
    /// non-array `gradients` to `[]`.
    pub fn new(root: &mut Value) -> Self {
        let mut editor = Self::default();
        editor.rebuild(root);
        editor
    }

    pub fn groups(&self) -> &[StopGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Text shown in place of the groups when there are none.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_PLACEHOLDER)
    }

    pub fn add_label(&self) -> &'static str {
        ADD_LABEL
    }

    /// Appends the default stop.
    pub fn add(&mut self, root: &mut Value) -> Result<()> {
        let stop = serde_json::to_value(default_gradient_stop())?;
        stops_mut(root).push(stop);
        self.rebuild(root);
        Ok(())
    }

    /// Removes the stop at `index`.
    pub fn remove(&mut self, root: &mut Value, index: usize) -> Result<()> {
        let stops = stops_mut(root);
        if index >= stops.len() {
            return Err(Error::StopOutOfRange {
                index,
                len: stops.len(),
            });
        }
        stops.remove(index);
        self.rebuild(root);
        Ok(())
    }

    /// Discards every group and binds fresh ones to the current list.
    pub fn rebuild(&mut self, root: &mut Value) {
        let len = stops_mut(root).len();
        let root: &Value = root;
        self.groups = (0..len).map(|i| StopGroup::new(i, root)).collect();
    }

    pub(crate) fn binding(&self, path: &ConfigPath) -> Option<&FieldBinding> {
        self.groups
            .iter()
            .flat_map(|g| [&g.position, &g.color])
            .find(|b| b.path() == path)
    }

    pub(crate) fn binding_mut(&mut self, path: &ConfigPath) -> Option<&mut FieldBinding> {
        self.groups
            .iter_mut()
            .flat_map(|g| [&mut g.position, &mut g.color])
            .find(|b| b.path() == path)
    }
}

/// The stop array, created in place when missing or malformed.
fn stops_mut(root: &mut Value) -> &mut Vec<Value> {
    let path = ConfigPath::parse(GRADIENTS_PATH);
    if !path.get(root).is_some_and(Value::is_array) {
        path.set(root, Value::Array(Vec::new()));
    }
    match root.get_mut(GRADIENTS_PATH) {
        Some(Value::Array(stops)) => stops,
        _ => unreachable!("gradients was just normalized to an array"),
    }
}
