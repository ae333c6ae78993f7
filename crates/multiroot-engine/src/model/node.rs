//! Model tree nodes.

use std::collections::{BTreeMap, BTreeSet};

use smol_str::SmolStr;

/// A node of the model tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Plain text node without attributes.
    pub fn text(data: impl Into<String>) -> Self {
        Node::Text(Text::new(data))
    }

    /// Element node with the given children.
    pub fn element(name: impl Into<SmolStr>, children: Vec<Node>) -> Self {
        Node::Element(Element::with_children(name, children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|el| el.name == name)
    }
}

/// Model element, e.g. `paragraph` or `heading1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: SmolStr,
    pub attributes: BTreeMap<SmolStr, SmolStr>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self::with_children(name, Vec::new())
    }

    pub fn with_children(name: impl Into<SmolStr>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Text with formatting attributes (`bold`, `italic`...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    pub data: String,
    pub attributes: BTreeSet<SmolStr>,
}

impl Text {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            attributes: BTreeSet::new(),
        }
    }

    pub fn with_attributes<'a>(
        data: impl Into<String>,
        attributes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            data: data.into(),
            attributes: attributes.into_iter().map(SmolStr::new).collect(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }
}

/// Detached list of nodes, the unit of insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}
