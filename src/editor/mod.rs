//! Path-addressed configuration editor.
//!
//! [`ConfigEditor`] owns the configuration document and a tree of
//! [`Section`]s holding [`FieldBinding`]s. A host UI draws the sections,
//! forwards raw control input through [`ConfigEditor::input`], and
//! re-renders from the document whenever the notifier fires.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use userbar_renderer::editor::{ConfigEditor, RawInput};
//!
//! let changes = Rc::new(Cell::new(0));
//! let seen = Rc::clone(&changes);
//! let mut editor = ConfigEditor::with_defaults(move |_doc| seen.set(seen.get() + 1)).unwrap();
//! assert_eq!(changes.get(), 1);
//!
//! editor.input("text.value", RawInput::Text("gg".into())).unwrap();
//! assert_eq!(editor.document()["text"]["value"], json!("gg"));
//! assert_eq!(editor.options().unwrap().text.value, "gg");
//! assert_eq!(changes.get(), 2);
//! ```

pub mod field;
pub mod gradients;
pub mod toggle;

pub use field::{ControlValue, FieldBinding, FieldKind, RawInput};
pub use gradients::{GradientListEditor, StopGroup};
pub use toggle::SectionToggle;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::{
    GradientDirection, GradientType, UserbarOptions, default_crosshatch, default_diag_stripes,
};
use crate::path::ConfigPath;
use crate::source::{FileImporter, FsImporter};

/// Largest banner width or height the dimension controls accept.
pub const MAX_DIMENSION: f64 = 4096.0;

/// Largest stripe spacing the spacing controls accept.
pub const MAX_SPACING: f64 = 1024.0;

// ============================================================================
// Sections
// ============================================================================

/// Column a top-level section is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Left,
    Right,
}

/// Something shown inside a section body.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionItem {
    Field(FieldBinding),
    /// A nested section, e.g. the text stroke inside the text section.
    Section(Section),
    Gradients(GradientListEditor),
}

/// A titled, collapsible group of controls.
///
/// Sections with a [`SectionToggle`] hide their body while the toggled
/// sub-tree is null. Bindings exist either way and are refreshed from the
/// document whenever the section is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    title: &'static str,
    container: Container,
    collapsed: bool,
    toggle: Option<SectionToggle>,
    items: Vec<SectionItem>,
}

impl Section {
    fn new(title: &'static str, container: Container) -> Self {
        Self {
            title,
            container,
            collapsed: false,
            toggle: None,
            items: Vec::new(),
        }
    }

    fn optional(title: &'static str, container: Container, toggle: SectionToggle) -> Self {
        Self {
            toggle: Some(toggle),
            ..Self::new(title, container)
        }
    }

    fn field(mut self, label: &str, kind: FieldKind, path: &str, root: &Value) -> Self {
        self.items
            .push(SectionItem::Field(FieldBinding::new(label, kind, path, root)));
        self
    }

    fn item(mut self, item: SectionItem) -> Self {
        self.items.push(item);
        self
    }

    /// Header text, e.g. `✩ Border`.
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Column the section is laid out in. Nested sections report the
    /// column of their own declaration.
    pub fn container(&self) -> Container {
        self.container
    }

    /// Presentational only; independent of enable/disable.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// The enable/disable switch, for optional sections.
    pub fn toggle(&self) -> Option<&SectionToggle> {
        self.toggle.as_ref()
    }

    /// Section body in display order.
    pub fn items(&self) -> &[SectionItem] {
        &self.items
    }

    /// Sections without a toggle are always enabled.
    pub fn is_enabled(&self, root: &Value) -> bool {
        self.toggle.as_ref().is_none_or(|t| t.is_enabled(root))
    }

    /// Toggle button text, for sections that have one.
    pub fn toggle_label(&self, root: &Value) -> Option<&'static str> {
        self.toggle.as_ref().map(|t| t.label(root))
    }

    fn refresh(&mut self, root: &mut Value) {
        for item in &mut self.items {
            match item {
                SectionItem::Field(binding) => binding.refresh(root),
                SectionItem::Section(section) => section.refresh(root),
                SectionItem::Gradients(list) => list.rebuild(root),
            }
        }
    }

    fn find(&self, title: &str) -> Option<&Section> {
        if self.title == title {
            return Some(self);
        }
        self.items.iter().find_map(|item| match item {
            SectionItem::Section(s) => s.find(title),
            _ => None,
        })
    }

    fn find_mut(&mut self, title: &str) -> Option<&mut Section> {
        if self.title == title {
            return Some(self);
        }
        self.items.iter_mut().find_map(|item| match item {
            SectionItem::Section(s) => s.find_mut(title),
            _ => None,
        })
    }

    fn binding(&self, path: &ConfigPath) -> Option<&FieldBinding> {
        self.items.iter().find_map(|item| match item {
            SectionItem::Field(b) => (b.path() == path).then_some(b),
            SectionItem::Section(s) => s.binding(path),
            SectionItem::Gradients(list) => list.binding(path),
        })
    }

    fn binding_mut(&mut self, path: &ConfigPath) -> Option<&mut FieldBinding> {
        self.items.iter_mut().find_map(|item| match item {
            SectionItem::Field(b) => (b.path() == path).then_some(b),
            SectionItem::Section(s) => s.binding_mut(path),
            SectionItem::Gradients(list) => list.binding_mut(path),
        })
    }

    /// Like [`binding_mut`](Self::binding_mut), also reporting the title of
    /// the outermost enclosing section that is currently disabled.
    fn scoped_binding_mut(
        &mut self,
        path: &ConfigPath,
        root: &Value,
        disabled: Option<&'static str>,
    ) -> Option<(&mut FieldBinding, Option<&'static str>)> {
        let disabled = disabled.or_else(|| (!self.is_enabled(root)).then_some(self.title));
        self.items.iter_mut().find_map(|item| match item {
            SectionItem::Field(b) => (b.path() == path).then_some((b, disabled)),
            SectionItem::Section(s) => s.scoped_binding_mut(path, root, disabled),
            SectionItem::Gradients(list) => list.binding_mut(path).map(|b| (b, disabled)),
        })
    }

    fn gradients(&self) -> Option<&GradientListEditor> {
        self.items.iter().find_map(|item| match item {
            SectionItem::Gradients(list) => Some(list),
            SectionItem::Section(s) => s.gradients(),
            SectionItem::Field(_) => None,
        })
    }

    fn gradients_mut(&mut self) -> Option<&mut GradientListEditor> {
        self.items.iter_mut().find_map(|item| match item {
            SectionItem::Gradients(list) => Some(list),
            SectionItem::Section(s) => s.gradients_mut(),
            SectionItem::Field(_) => None,
        })
    }
}

// ============================================================================
// ConfigEditor
// ============================================================================

/// Called with the whole document after every change.
pub type Notifier = Box<dyn FnMut(&Value)>;

/// Owns the configuration document and the controls editing it.
pub struct ConfigEditor<I = FsImporter> {
    document: Value,
    sections: Vec<Section>,
    importer: I,
    notifier: Notifier,
}

impl ConfigEditor<FsImporter> {
    /// Edits `document`, importing files from disk.
    pub fn new(document: Value, notifier: impl FnMut(&Value) + 'static) -> Result<Self> {
        Self::with_importer(document, FsImporter, notifier)
    }

    /// Edits a document holding the default options.
    pub fn with_defaults(notifier: impl FnMut(&Value) + 'static) -> Result<Self> {
        Self::new(UserbarOptions::default().to_document()?, notifier)
    }
}

impl<I: FileImporter> ConfigEditor<I> {
    /// Builds every section against `document`, then notifies once so the
    /// host can draw the initial state.
    pub fn with_importer(
        mut document: Value,
        importer: I,
        notifier: impl FnMut(&Value) + 'static,
    ) -> Result<Self> {
        let sections = build_sections(&mut document)?;
        let mut editor = Self {
            document,
            sections,
            importer,
            notifier: Box::new(notifier),
        };
        editor.notify();
        Ok(editor)
    }

    /// The live configuration document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Gives up the editor, keeping the document.
    pub fn into_document(self) -> Value {
        self.document
    }

    /// Top-level sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section, nested ones included, by title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find_map(|s| s.find(title))
    }

    /// The gradient stop list inside `✩ Gradients`.
    pub fn gradient_list(&self) -> Option<&GradientListEditor> {
        self.sections.iter().find_map(Section::gradients)
    }

    /// The control bound to exactly `path`, if any.
    pub fn binding(&self, path: &str) -> Option<&FieldBinding> {
        let path = ConfigPath::parse(path);
        self.sections.iter().find_map(|s| s.binding(&path))
    }

    /// Typed snapshot of the current document.
    pub fn options(&self) -> Result<UserbarOptions> {
        Ok(UserbarOptions::from_document(&self.document)?)
    }

    /// Feeds raw control input to the binding at `path`.
    ///
    /// Refused input leaves the document unchanged and does not notify.
    /// Controls inside a disabled section refuse input, so an optional
    /// sub-tree is never written partially.
    pub fn input(&mut self, path: &str, raw: RawInput) -> Result<()> {
        let path = ConfigPath::parse(path);
        let Self {
            document,
            sections,
            importer,
            ..
        } = self;
        let (binding, disabled) = sections
            .iter_mut()
            .find_map(|s| s.scoped_binding_mut(&path, document, None))
            .ok_or_else(|| Error::UnknownField(path.to_string()))?;
        if let Some(title) = disabled {
            return Err(Error::invalid_input(
                path.to_string(),
                format!("section `{title}` is disabled"),
            ));
        }
        binding.apply(raw, document, &*importer)?;
        self.notify();
        Ok(())
    }

    /// Enables or disables a section's sub-tree; returns the new state.
    pub fn toggle_section(&mut self, title: &str) -> Result<bool> {
        let section = self
            .sections
            .iter_mut()
            .find_map(|s| s.find_mut(title))
            .ok_or_else(|| Error::UnknownSection(title.to_string()))?;
        let Some(toggle) = section.toggle.clone() else {
            return Err(Error::UnknownSection(title.to_string()));
        };
        let enabled = toggle.toggle(&mut self.document);
        if enabled {
            section.refresh(&mut self.document);
        }
        debug!(section = title, enabled, "toggled section");
        self.notify();
        Ok(enabled)
    }

    /// Flips a section's collapsed flag; returns the new value.
    pub fn toggle_collapsed(&mut self, title: &str) -> Result<bool> {
        let section = self
            .sections
            .iter_mut()
            .find_map(|s| s.find_mut(title))
            .ok_or_else(|| Error::UnknownSection(title.to_string()))?;
        section.collapsed = !section.collapsed;
        Ok(section.collapsed)
    }

    /// Appends the default gradient stop.
    pub fn add_stop(&mut self) -> Result<()> {
        if let Some(list) = self.sections.iter_mut().find_map(Section::gradients_mut) {
            list.add(&mut self.document)?;
        }
        self.notify();
        Ok(())
    }

    /// Removes the gradient stop at `index`.
    pub fn remove_stop(&mut self, index: usize) -> Result<()> {
        if let Some(list) = self.sections.iter_mut().find_map(Section::gradients_mut) {
            list.remove(&mut self.document, index)?;
        }
        self.notify();
        Ok(())
    }

    /// Sets `value` at `path` programmatically, shows it in the control
    /// bound to that path, then notifies.
    ///
    /// When no control is bound to exactly `path` (a whole sub-tree or the
    /// stop list was replaced) every control re-reads the document first.
    pub fn update_option(&mut self, path: &str, value: Value) {
        let path = ConfigPath::parse(path);
        path.set(&mut self.document, value.clone());

        if let Some(binding) = self.sections.iter_mut().find_map(|s| s.binding_mut(&path)) {
            binding.reflect(Some(&value));
        } else {
            self.refresh_all();
        }
        self.notify();
    }

    fn refresh_all(&mut self) {
        for section in &mut self.sections {
            section.refresh(&mut self.document);
        }
    }

    fn notify(&mut self) {
        debug!("configuration changed");
        (self.notifier)(&self.document);
    }
}

// ============================================================================
// Layout
// ============================================================================

fn build_sections(root: &mut Value) -> Result<Vec<Section>> {
    use Container::{Left, Right};

    let gradients = GradientListEditor::new(root);
    let root: &Value = root;

    let dimensions = Section::new("✩ Dimensions", Left)
        .field("Width", FieldKind::integer(1.0, MAX_DIMENSION), "width", root)
        .field("Height", FieldKind::integer(1.0, MAX_DIMENSION), "height", root);

    let border = Section::new("✩ Border", Left)
        .field("Color", FieldKind::Color, "border.color", root)
        .field("Width", FieldKind::number_from(0.0), "border.width", root);

    let lines = Section::optional(
        "✩ Background lines",
        Left,
        SectionToggle::new("diagStripes", serde_json::to_value(default_diag_stripes())?),
    )
    .field("Color", FieldKind::Color, "diagStripes.color", root)
    .field("Spacing", FieldKind::integer(1.0, MAX_SPACING), "diagStripes.spacing", root)
    .field("On Main Diagonal", FieldKind::Boolean, "diagStripes.onMainDiagonal", root);

    let grid = Section::optional(
        "✩ Background grid",
        Left,
        SectionToggle::new("diagStripesV2", serde_json::to_value(default_crosshatch())?),
    )
    .field("Color", FieldKind::Color, "diagStripesV2.color", root)
    .field("Spacing", FieldKind::integer(1.0, MAX_SPACING), "diagStripesV2.spacing", root);

    let stroke = Section::optional(
        "✩ Text Stroke",
        Right,
        SectionToggle::new("text.stroke", json!({ "width": 1, "color": "black" })),
    )
    .field(
        "Width",
        FieldKind::Number {
            min: Some(0.0),
            max: None,
            step: Some(0.1),
            integer: false,
        },
        "text.stroke.width",
        root,
    )
    .field("Color", FieldKind::Color, "text.stroke.color", root);

    let text = Section::new("✩ Text", Right)
        .field("Value", FieldKind::Text, "text.value", root)
        .field("Size", FieldKind::number_from(1.0), "text.size", root)
        .field("Color", FieldKind::Color, "text.color", root)
        .field("X Position", FieldKind::number(), "text.x", root)
        .field("Y Position", FieldKind::number(), "text.y", root)
        .item(SectionItem::Section(stroke));

    let gradient = Section::new("✩ Gradients", Right)
        .field("Type", FieldKind::select(&GradientType::NAMES), "gradientType", root)
        .field(
            "Direction",
            FieldKind::select(&GradientDirection::NAMES),
            "gradientDirection",
            root,
        )
        .item(SectionItem::Gradients(gradients));

    let background = Section::optional(
        "✩ Background Image",
        Right,
        SectionToggle::new(
            "backgroundImage",
            json!({ "src": "", "width": 350, "height": 0, "x": 0, "y": 0 }),
        ),
    )
    .field(
        "",
        FieldKind::File {
            accept: "image/*".to_string(),
        },
        "backgroundImage.src",
        root,
    )
    .field("Width", FieldKind::number_from(0.0), "backgroundImage.width", root)
    .field("Height", FieldKind::number_from(0.0), "backgroundImage.height", root)
    .field("X Position", FieldKind::number(), "backgroundImage.x", root)
    .field("Y Position", FieldKind::number(), "backgroundImage.y", root);

    Ok(vec![
        dimensions, border, lines, grid, text, gradient, background,
    ])
}
