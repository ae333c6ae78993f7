//! Editing view: which host element renders which root.

use std::cell::RefCell;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::element::ElementId;

/// A DOM root attached to the editing view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomRoot {
    pub element: ElementId,
    pub placeholder: Option<String>,
}

/// Rendering engine bookkeeping for attached roots.
#[derive(Debug, Default)]
pub struct EditingView {
    roots: RefCell<IndexMap<SmolStr, DomRoot>>,
}

impl EditingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render root `name` into `element`.
    ///
    /// Re-attaching a name replaces the previous element.
    pub fn attach_dom_root(&self, element: ElementId, name: &str) {
        let mut roots = self.roots.borrow_mut();
        match roots.get_mut(name) {
            Some(existing) if existing.element == element => {}
            Some(existing) => {
                warn!(
                    root = %name,
                    old = %existing.element,
                    new = %element,
                    "replacing attached DOM root"
                );
                existing.element = element;
            }
            None => {
                roots.insert(
                    SmolStr::new(name),
                    DomRoot {
                        element,
                        placeholder: None,
                    },
                );
            }
        }
        debug!(root = %name, %element, "attached DOM root");
    }

    /// Stop rendering root `name`. Returns the detached root, if any.
    pub fn detach_dom_root(&self, name: &str) -> Option<DomRoot> {
        let detached = self.roots.borrow_mut().shift_remove(name);
        match &detached {
            Some(root) => debug!(root = %name, element = %root.element, "detached DOM root"),
            None => debug!(root = %name, "no DOM root to detach"),
        }
        detached
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.roots.borrow().contains_key(name)
    }

    pub fn dom_root(&self, name: &str) -> Option<ElementId> {
        self.roots.borrow().get(name).map(|root| root.element)
    }

    pub fn attached_names(&self) -> Vec<SmolStr> {
        self.roots.borrow().keys().cloned().collect()
    }

    /// Show `text` while root `name` is empty. Returns false if not attached.
    pub fn enable_placeholder(&self, name: &str, text: impl Into<String>) -> bool {
        match self.roots.borrow_mut().get_mut(name) {
            Some(root) => {
                root.placeholder = Some(text.into());
                true
            }
            None => false,
        }
    }

    pub fn placeholder(&self, name: &str) -> Option<String> {
        self.roots
            .borrow()
            .get(name)
            .and_then(|root| root.placeholder.clone())
    }

    /// Detach every root.
    pub fn destroy(&self) {
        let count = self.roots.borrow().len();
        self.roots.borrow_mut().clear();
        debug!(count, "editing view destroyed");
    }
}
