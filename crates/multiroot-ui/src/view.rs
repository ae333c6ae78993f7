//! The editor's view hierarchy: one shared toolbar plus an editable per root.
//!
//! The hierarchy renders once. Editables registered afterwards are rendered
//! as they join, so adding roots never re-renders the whole tree.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use multiroot_engine::Container;
use smol_str::SmolStr;
use tracing::debug;

use crate::editable::EditableView;
use crate::error::UiError;
use crate::toolbar::ToolbarView;

#[derive(Debug, Default)]
pub struct EditorUiView {
    toolbar: ToolbarView,
    editables: RefCell<Vec<Rc<EditableView>>>,
    rendered: Cell<bool>,
}

impl EditorUiView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view with one editable per container.
    pub fn with_containers<'a>(
        containers: impl IntoIterator<Item = (&'a SmolStr, &'a Container)>,
    ) -> Result<Self, UiError> {
        let view = Self::new();
        view.add(containers)?;
        Ok(view)
    }

    pub fn toolbar(&self) -> &ToolbarView {
        &self.toolbar
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.get()
    }

    /// Render the toolbar and every registered editable.
    pub fn render(&self) -> Result<(), UiError> {
        if self.rendered.get() {
            return Err(UiError::AlreadyRendered {
                view: SmolStr::new_static("editor"),
            });
        }
        self.toolbar.render()?;
        for editable in self.editables() {
            editable.render()?;
        }
        self.rendered.set(true);
        debug!(editables = self.editables.borrow().len(), "view rendered");
        Ok(())
    }

    /// Register one editable per container, rendering each immediately when
    /// the hierarchy is already rendered. Returns the new views.
    pub fn add<'a>(
        &self,
        containers: impl IntoIterator<Item = (&'a SmolStr, &'a Container)>,
    ) -> Result<Vec<Rc<EditableView>>, UiError> {
        let containers: Vec<_> = containers.into_iter().collect();
        if let Some((name, _)) = containers.iter().find(|(name, _)| self.editable(name).is_some())
        {
            return Err(UiError::DuplicateRoot {
                name: (*name).clone(),
            });
        }
        for (index, (name, container)) in containers.iter().enumerate() {
            let holder = self
                .editable_for(container)
                .map(|editable| SmolStr::new(editable.name()))
                .or_else(|| {
                    containers[..index]
                        .iter()
                        .find(|(_, other)| other.id() == container.id())
                        .map(|(other, _)| (*other).clone())
                });
            if let Some(holder) = holder {
                return Err(UiError::ContainerInUse {
                    name: (*name).clone(),
                    holder,
                });
            }
        }

        let mut added = Vec::new();
        for (name, container) in containers {
            let editable = EditableView::new(name.clone(), container.clone());
            if self.rendered.get() {
                editable.render()?;
            }
            self.editables.borrow_mut().push(editable.clone());
            added.push(editable);
        }
        Ok(added)
    }

    /// Deregister and destroy the editable for `name`.
    pub fn remove(&self, name: &str) -> Option<Rc<EditableView>> {
        let removed = {
            let mut editables = self.editables.borrow_mut();
            let index = editables.iter().position(|e| e.name() == name)?;
            editables.remove(index)
        };
        removed.destroy();
        debug!(root = %name, "editable removed from view");
        Some(removed)
    }

    pub fn editable(&self, name: &str) -> Option<Rc<EditableView>> {
        self.editables
            .borrow()
            .iter()
            .find(|e| e.name() == name)
            .cloned()
    }

    /// The editable rendered into `container`, if any.
    pub fn editable_for(&self, container: &Container) -> Option<Rc<EditableView>> {
        self.editables
            .borrow()
            .iter()
            .find(|e| e.element() == container.id())
            .cloned()
    }

    pub fn editables(&self) -> Vec<Rc<EditableView>> {
        self.editables.borrow().clone()
    }

    pub fn destroy(&self) {
        let editables = std::mem::take(&mut *self.editables.borrow_mut());
        for editable in &editables {
            editable.destroy();
        }
        self.toolbar.destroy();
        self.rendered.set(false);
        debug!(editables = editables.len(), "view destroyed");
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::editable::CONTENT_EDITABLE;

    fn containers(names: &[&str]) -> IndexMap<SmolStr, Container> {
        names
            .iter()
            .map(|name| (SmolStr::new(name), Container::new("div")))
            .collect()
    }

    #[test]
    fn test_render_once() {
        let view = EditorUiView::with_containers(&containers(&["a"])).unwrap();
        view.render().unwrap();
        assert!(view.toolbar().is_rendered());
        assert!(matches!(
            view.render(),
            Err(UiError::AlreadyRendered { .. })
        ));
    }

    #[test]
    fn test_add_after_render_renders_incrementally() {
        let view = EditorUiView::with_containers(&containers(&["a"])).unwrap();
        view.render().unwrap();

        let later = containers(&["b"]);
        let added = view.add(&later).unwrap();

        assert_eq!(added.len(), 1);
        assert!(added[0].is_rendered());
        assert_eq!(
            later["b"].attribute(CONTENT_EDITABLE).as_deref(),
            Some("true")
        );
        assert_eq!(view.editables().len(), 2);
    }

    #[test]
    fn test_add_before_render_waits() {
        let view = EditorUiView::new();
        let added = view.add(&containers(&["a"])).unwrap();
        assert!(!added[0].is_rendered());

        view.render().unwrap();
        assert!(added[0].is_rendered());
    }

    #[test]
    fn test_remove_destroys_editable() {
        let set = containers(&["a", "b"]);
        let view = EditorUiView::with_containers(&set).unwrap();
        view.render().unwrap();

        let removed = view.remove("a").unwrap();
        assert!(!removed.is_rendered());
        assert_eq!(set["a"].attribute(CONTENT_EDITABLE), None);
        assert!(view.editable("a").is_none());
        assert!(view.remove("a").is_none());
        assert!(view.editable("b").is_some());
    }

    #[test]
    fn test_shared_container_rejected() {
        let shared = Container::new("div");
        let view = EditorUiView::with_containers(&containers(&["a"])).unwrap();

        let mut batch = IndexMap::new();
        batch.insert(SmolStr::new("x"), shared.clone());
        batch.insert(SmolStr::new("y"), shared.clone());
        assert_eq!(
            view.add(&batch).unwrap_err(),
            UiError::ContainerInUse {
                name: "y".into(),
                holder: "x".into()
            }
        );
        assert!(view.editable("x").is_none());

        let taken = view.editable("a").unwrap().container().clone();
        let mut batch = IndexMap::new();
        batch.insert(SmolStr::new("b"), taken);
        assert_eq!(
            view.add(&batch).unwrap_err(),
            UiError::ContainerInUse {
                name: "b".into(),
                holder: "a".into()
            }
        );
        assert_eq!(view.editables().len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let view = EditorUiView::with_containers(&containers(&["a"])).unwrap();
        assert!(matches!(
            view.add(&containers(&["a"])),
            Err(UiError::DuplicateRoot { .. })
        ));
    }
}
