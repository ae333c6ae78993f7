//! Focus tracker: which tracked element holds focus, if any.

use std::cell::RefCell;

use indexmap::IndexSet;
use multiroot_engine::{ElementId, Observable, SubscriptionId};
use tracing::trace;

use crate::error::UiError;

/// Tracks focus across a set of elements that together form the editor.
///
/// `is_focused` is true while any tracked element holds focus.
/// `focused_element` is the tracked element holding it.
#[derive(Debug, Default)]
pub struct FocusTracker {
    elements: RefCell<IndexSet<ElementId>>,
    is_focused: Observable<bool>,
    focused_element: Observable<Option<ElementId>>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `element`.
    pub fn add(&self, element: ElementId) -> Result<(), UiError> {
        if !self.elements.borrow_mut().insert(element) {
            return Err(UiError::AlreadyTracked { element });
        }
        trace!(%element, "tracking element");
        Ok(())
    }

    /// Stop tracking `element`. Removing the focused element blurs.
    pub fn remove(&self, element: ElementId) -> bool {
        let removed = self.elements.borrow_mut().shift_remove(&element);
        if removed && self.focused_element.get() == Some(element) {
            self.blur();
        }
        removed
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.borrow().contains(&element)
    }

    pub fn elements(&self) -> Vec<ElementId> {
        self.elements.borrow().iter().copied().collect()
    }

    /// `element` received focus.
    ///
    /// Focus landing on an untracked element means focus left the editor.
    /// Returns true if the element is tracked.
    pub fn focus(&self, element: ElementId) -> bool {
        if !self.contains(element) {
            self.blur();
            return false;
        }
        self.focused_element.set(Some(element));
        self.is_focused.set(true);
        true
    }

    /// Focus left the editor.
    pub fn blur(&self) {
        self.is_focused.set(false);
        self.focused_element.set(None);
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused.get()
    }

    pub fn focused_element(&self) -> Option<ElementId> {
        self.focused_element.get()
    }

    pub fn on_is_focused_change(&self, listener: impl Fn(&bool) + 'static) -> SubscriptionId {
        self.is_focused.subscribe(listener)
    }

    pub fn on_focused_element_change(
        &self,
        listener: impl Fn(&Option<ElementId>) + 'static,
    ) -> SubscriptionId {
        self.focused_element.subscribe(listener)
    }

    pub fn off_is_focused_change(&self, id: SubscriptionId) -> bool {
        self.is_focused.unsubscribe(id)
    }

    pub fn off_focused_element_change(&self, id: SubscriptionId) -> bool {
        self.focused_element.unsubscribe(id)
    }

    /// Forget every element and listener.
    pub fn destroy(&self) {
        self.blur();
        self.elements.borrow_mut().clear();
        self.is_focused.clear_listeners();
        self.focused_element.clear_listeners();
    }
}
