//! Shared toolbar and the component factory feeding it.

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use multiroot_engine::ElementId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::UiError;

/// Toolbar item name rendering a separator.
pub const SEPARATOR: &str = "|";
/// Toolbar item name forcing a line break.
pub const LINE_BREAK: &str = "-";

/// Toolbar configuration: either a bare item list or `{ "items": [...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolbarConfig {
    Items(Vec<SmolStr>),
    Detailed { items: Vec<SmolStr> },
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

impl ToolbarConfig {
    pub fn items(&self) -> &[SmolStr] {
        match self {
            Self::Items(items) | Self::Detailed { items } => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<S: Into<SmolStr>> FromIterator<S> for ToolbarConfig {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Items(iter.into_iter().map(Into::into).collect())
    }
}

/// A toolbar button created by the component factory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonView {
    pub name: SmolStr,
    pub label: SmolStr,
    pub element: ElementId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolbarItem {
    Button(ButtonView),
    Separator,
    LineBreak,
}

impl ToolbarItem {
    pub fn name(&self) -> &str {
        match self {
            Self::Button(button) => &button.name,
            Self::Separator => SEPARATOR,
            Self::LineBreak => LINE_BREAK,
        }
    }
}

/// Named UI components that plugins register and the toolbar instantiates.
#[derive(Debug, Default)]
pub struct ComponentFactory {
    components: RefCell<IndexMap<SmolStr, SmolStr>>,
}

impl ComponentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register component `name` with a button label.
    pub fn add(&self, name: impl Into<SmolStr>, label: impl Into<SmolStr>) -> Result<(), UiError> {
        let name = name.into();
        let mut components = self.components.borrow_mut();
        if components.contains_key(&name) {
            return Err(UiError::ComponentExists { name });
        }
        debug!(component = %name, "component registered");
        components.insert(name, label.into());
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.components.borrow().contains_key(name)
    }

    /// Instantiate a fresh button for `name`.
    pub fn create(&self, name: &str) -> Result<ButtonView, UiError> {
        let label = self
            .components
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| UiError::UnknownComponent {
                name: SmolStr::new(name),
            })?;
        Ok(ButtonView {
            name: SmolStr::new(name),
            label,
            element: ElementId::next(),
        })
    }

    pub fn names(&self) -> Vec<SmolStr> {
        self.components.borrow().keys().cloned().collect()
    }
}

#[derive(Debug)]
pub struct ToolbarView {
    element: ElementId,
    items: RefCell<Vec<ToolbarItem>>,
    rendered: Cell<bool>,
}

impl Default for ToolbarView {
    fn default() -> Self {
        Self {
            element: ElementId::next(),
            items: RefCell::new(Vec::new()),
            rendered: Cell::new(false),
        }
    }
}

impl ToolbarView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.get()
    }

    pub fn render(&self) -> Result<(), UiError> {
        if self.rendered.replace(true) {
            return Err(UiError::AlreadyRendered {
                view: SmolStr::new_static("toolbar"),
            });
        }
        Ok(())
    }

    /// Replace the items with the ones named in `config`.
    ///
    /// Names the factory does not know are skipped.
    pub fn fill_from_config(&self, config: &ToolbarConfig, factory: &ComponentFactory) {
        let items: Vec<ToolbarItem> = config
            .items()
            .iter()
            .filter_map(|name| match name.as_str() {
                SEPARATOR => Some(ToolbarItem::Separator),
                LINE_BREAK => Some(ToolbarItem::LineBreak),
                other => match factory.create(other) {
                    Ok(button) => Some(ToolbarItem::Button(button)),
                    Err(err) => {
                        warn!(item = %other, %err, "toolbar item unavailable, skipping");
                        None
                    }
                },
            })
            .collect();
        debug!(items = items.len(), "toolbar filled");
        *self.items.borrow_mut() = items;
    }

    pub fn items(&self) -> Vec<ToolbarItem> {
        self.items.borrow().clone()
    }

    pub fn item_names(&self) -> Vec<SmolStr> {
        self.items
            .borrow()
            .iter()
            .map(|item| SmolStr::new(item.name()))
            .collect()
    }

    pub fn destroy(&self) {
        self.items.borrow_mut().clear();
        self.rendered.set(false);
    }
}
