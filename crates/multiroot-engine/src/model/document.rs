//! The document: a collection of named roots plus a version counter.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::node::Node;
use crate::error::ModelError;

/// Element type used for editable roots.
pub const ROOT_ELEMENT_TYPE: &str = "$root";

/// Top-level element of one editable region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootElement {
    name: SmolStr,
    root_type: SmolStr,
    children: Vec<Node>,
    attached: bool,
}

impl RootElement {
    fn new(root_type: &str, name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            root_type: SmolStr::new(root_type),
            children: Vec::new(),
            attached: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// False once the root has been detached from its document.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }
}

/// Roots keyed by name, plus the document version.
#[derive(Debug, Default)]
pub struct Document {
    roots: IndexMap<SmolStr, RootElement>,
    version: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn root(&self, name: &str) -> Option<&RootElement> {
        self.roots.get(name)
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    pub fn root_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.roots.keys()
    }

    pub fn roots(&self) -> impl Iterator<Item = &RootElement> {
        self.roots.values()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub(crate) fn root_mut(&mut self, name: &str) -> Result<&mut RootElement, ModelError> {
        self.roots
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownRoot {
                name: SmolStr::new(name),
            })
    }

    pub(crate) fn create_root(&mut self, root_type: &str, name: &str) -> Result<(), ModelError> {
        if self.roots.contains_key(name) {
            return Err(ModelError::DuplicateRoot {
                name: SmolStr::new(name),
            });
        }
        self.roots
            .insert(SmolStr::new(name), RootElement::new(root_type, name));
        Ok(())
    }

    pub(crate) fn detach_root(&mut self, name: &str) -> Option<RootElement> {
        let mut root = self.roots.shift_remove(name)?;
        root.attached = false;
        Some(root)
    }

    pub(crate) fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    pub(crate) fn clear(&mut self) {
        for (_, mut root) in self.roots.drain(..) {
            root.attached = false;
        }
    }
}
