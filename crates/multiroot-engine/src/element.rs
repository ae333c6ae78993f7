//! External content containers.
//!
//! A `Container` stands in for the host element a root is created from. The
//! caller owns it; the editor only holds clones of the handle, reads its
//! content when a root is created and writes the final content back when the
//! root is removed or the editor is destroyed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smol_str::SmolStr;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an element (container, toolbar, button...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate a fresh id, unique for the lifetime of the process.
    pub fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

struct ContainerInner {
    id: ElementId,
    tag: SmolStr,
    attributes: RefCell<IndexMap<SmolStr, SmolStr>>,
    content: RefCell<String>,
}

/// Shared handle to a caller-owned host element.
///
/// Cloning is cheap and clones refer to the same element.
#[derive(Clone)]
pub struct Container {
    inner: Rc<ContainerInner>,
}

impl Container {
    /// Create an empty element with the given tag name.
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            inner: Rc::new(ContainerInner {
                id: ElementId::next(),
                tag: SmolStr::new(tag.into().to_ascii_lowercase()),
                attributes: RefCell::new(IndexMap::new()),
                content: RefCell::new(String::new()),
            }),
        }
    }

    /// Create an element holding `content`.
    pub fn with_content(tag: impl Into<SmolStr>, content: impl Into<String>) -> Self {
        let container = Self::new(tag);
        *container.inner.content.borrow_mut() = content.into();
        container
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    pub fn is_textarea(&self) -> bool {
        self.inner.tag == "textarea"
    }

    pub fn attribute(&self, name: &str) -> Option<SmolStr> {
        self.inner.attributes.borrow().get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        self.inner
            .attributes
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<SmolStr> {
        self.inner.attributes.borrow_mut().shift_remove(name)
    }

    /// Current content of the element.
    ///
    /// For a `<textarea>` this is its value, otherwise its inner markup.
    pub fn data(&self) -> String {
        self.inner.content.borrow().clone()
    }

    /// Replace the content of the element.
    pub fn set_data(&self, data: &str) {
        let mut content = self.inner.content.borrow_mut();
        content.clear();
        content.push_str(data);
    }

    /// True if both handles refer to the same element.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Container {}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("tag", &self.inner.tag)
            .finish_non_exhaustive()
    }
}
