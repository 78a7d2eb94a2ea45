//! Dotted-path addressing into the configuration document.
//!
//! A path such as `gradients.2.color` is split on `.`; segments that parse as
//! unsigned integers index into arrays, everything else names an object
//! field. Reads never fail: a missing or null intermediate yields `None`.
//! Writes never fail either: intermediates that are missing or are not
//! containers get replaced with empty objects on the way down.

use std::fmt;

use serde_json::{Map, Value};

/// One step of a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn parse(part: &str) -> Self {
        match part.parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Key(part.to_string()),
        }
    }

    /// Object key used when this segment addresses an object.
    fn key(&self) -> String {
        match self {
            Self::Key(key) => key.clone(),
            Self::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A parsed dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    segments: Vec<Segment>,
}

impl ConfigPath {
    /// Splits on `.`; segments that parse as `usize` become list indices.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(Segment::parse).collect(),
        }
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Appends a field name.
    pub fn key(mut self, key: &str) -> Self {
        self.segments.push(Segment::Key(key.to_string()));
        self
    }

    /// Appends an index.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    /// Reads the value at this path.
    ///
    /// Returns `Some(&Value::Null)` for an explicit null at the final
    /// segment, and `None` when anything along the way is missing.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = step(current, segment)?;
        }
        Some(current)
    }

    /// Writes `value` at this path, creating objects as needed.
    pub fn set(&self, root: &mut Value, value: Value) {
        let Some((last, parents)) = self.segments.split_last() else {
            return;
        };

        if !is_container(root) {
            *root = Value::Object(Map::new());
        }

        let mut current = root;
        for segment in parents {
            let child = slot(current, segment);
            if !is_container(child) {
                *child = Value::Object(Map::new());
            }
            current = child;
        }
        *slot(current, last) = value;
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for ConfigPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        (Value::Object(map), segment) => map.get(&segment.key()),
        _ => None,
    }
}

/// Mutable slot for `segment` inside `container`, created if missing.
fn slot<'a>(container: &'a mut Value, segment: &Segment) -> &'a mut Value {
    match (container, segment) {
        (Value::Array(items), Segment::Index(index)) => {
            if *index >= items.len() {
                items.resize(*index + 1, Value::Null);
            }
            &mut items[*index]
        }
        (Value::Object(map), segment) => map.entry(segment.key()).or_insert(Value::Null),
        (other, segment) => {
            // Arrays have no named slots; keep their items under index keys.
            let mut map = Map::new();
            if let Value::Array(items) = std::mem::take(other) {
                map.extend(items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)));
            }
            *other = Value::Object(map);
            match other {
                Value::Object(map) => map.entry(segment.key()).or_insert(Value::Null),
                _ => unreachable!("slot container was just replaced with an object"),
            }
        }
    }
}

/// Reads the value at `path` in `root`.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    ConfigPath::parse(path).get(root)
}

/// Writes `value` at `path` in `root`, auto-vivifying intermediates.
pub fn set(root: &mut Value, path: &str, value: Value) {
    ConfigPath::parse(path).set(root, value);
}

/// True when the value at `path` exists and is not null.
pub fn is_present(root: &Value, path: &str) -> bool {
    !matches!(get(root, path), None | Some(Value::Null))
}
