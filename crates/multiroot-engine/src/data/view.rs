//! View tree: the intermediate form between raw data and the model.

use indexmap::IndexMap;
use smol_str::SmolStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewElement {
    pub name: SmolStr,
    pub attributes: IndexMap<SmolStr, SmolStr>,
    pub children: Vec<ViewNode>,
}

impl ViewElement {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<SmolStr>, children: Vec<ViewNode>) -> Self {
        Self {
            children,
            ..Self::new(name)
        }
    }
}

/// Top-level list of view nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFragment {
    pub children: Vec<ViewNode>,
}

impl ViewFragment {
    pub fn new(children: Vec<ViewNode>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
