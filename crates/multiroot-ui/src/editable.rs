//! Editable views: one editing host per root container.

use std::cell::Cell;
use std::rc::Rc;

use multiroot_engine::{Container, ElementId, Observable, SubscriptionId};
use smol_str::SmolStr;
use tracing::trace;

use crate::error::UiError;

/// Attribute marking a host element as editable.
pub const CONTENT_EDITABLE: &str = "contenteditable";

/// The editable view of one root, rendered into its container.
#[derive(Debug)]
pub struct EditableView {
    name: SmolStr,
    container: Container,
    is_focused: Observable<bool>,
    rendered: Cell<bool>,
}

impl EditableView {
    pub fn new(name: impl Into<SmolStr>, container: Container) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            container,
            is_focused: Observable::new(false),
            rendered: Cell::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn element(&self) -> ElementId {
        self.container.id()
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.get()
    }

    /// Sticky focus state as computed by the focus coordinator.
    pub fn is_focused(&self) -> bool {
        self.is_focused.get()
    }

    pub(crate) fn set_focused(&self, focused: bool) {
        if self.is_focused.set(focused) {
            trace!(root = %self.name, focused, "editable focus changed");
        }
    }

    pub fn on_focus_change(&self, listener: impl Fn(&bool) + 'static) -> SubscriptionId {
        self.is_focused.subscribe(listener)
    }

    pub fn off_focus_change(&self, id: SubscriptionId) -> bool {
        self.is_focused.unsubscribe(id)
    }

    /// Turn the container into an editing host.
    pub fn render(&self) -> Result<(), UiError> {
        if self.rendered.replace(true) {
            return Err(UiError::AlreadyRendered {
                view: self.name.clone(),
            });
        }
        self.container.set_attribute(CONTENT_EDITABLE, "true");
        trace!(root = %self.name, element = %self.element(), "editable rendered");
        Ok(())
    }

    /// Hand the container back in its original state.
    pub fn destroy(&self) {
        if self.rendered.replace(false) {
            self.container.remove_attribute(CONTENT_EDITABLE);
        }
        self.is_focused.set(false);
        self.is_focused.clear_listeners();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_once() {
        let container = Container::new("div");
        let view = EditableView::new("main", container.clone());

        view.render().unwrap();
        assert_eq!(container.attribute(CONTENT_EDITABLE).as_deref(), Some("true"));
        assert_eq!(
            view.render(),
            Err(UiError::AlreadyRendered {
                view: "main".into()
            })
        );
    }

    #[test]
    fn test_destroy_restores_container() {
        let container = Container::with_content("div", "<p>x</p>");
        let view = EditableView::new("main", container.clone());
        view.render().unwrap();
        view.set_focused(true);

        view.destroy();
        assert_eq!(container.attribute(CONTENT_EDITABLE), None);
        assert_eq!(container.data(), "<p>x</p>");
        assert!(!view.is_focused());
        assert!(!view.is_rendered());
    }
}
