//! Sticky focus.
//!
//! An editable keeps its focused appearance while focus stays inside the
//! editor, even after focus moved to non-editable chrome such as the toolbar,
//! until another editable takes focus or focus leaves the editor entirely.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use multiroot_engine::{ElementId, SubscriptionId};
use tracing::{debug, trace};

use super::FocusTracker;
use crate::editable::EditableView;
use crate::error::UiError;

/// The sticky focus rule for one editable `element`.
pub fn is_sticky_focused(
    is_focused: bool,
    focused_element: Option<ElementId>,
    last_focused: Option<ElementId>,
    element: ElementId,
) -> bool {
    if !is_focused {
        return false;
    }
    focused_element == Some(element) || last_focused == Some(element)
}

/// Subscriptions keeping one editable's `is_focused` in sync with the tracker.
///
/// Hand it back to [`FocusCoordinator::release`] when the editable goes away.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a focus binding must be released"]
pub struct FocusBinding {
    element: ElementId,
    on_is_focused: SubscriptionId,
    on_focused_element: SubscriptionId,
}

impl FocusBinding {
    pub fn element(&self) -> ElementId {
        self.element
    }
}

#[derive(Debug)]
pub struct FocusCoordinator {
    tracker: Rc<FocusTracker>,
    editables: RefCell<IndexMap<ElementId, Weak<EditableView>>>,
    last_focused: Cell<Option<ElementId>>,
    own_subscriptions: Cell<Option<(SubscriptionId, SubscriptionId)>>,
}

impl FocusCoordinator {
    pub fn new(tracker: Rc<FocusTracker>) -> Rc<Self> {
        let coordinator = Rc::new(Self {
            tracker: tracker.clone(),
            editables: RefCell::new(IndexMap::new()),
            last_focused: Cell::new(None),
            own_subscriptions: Cell::new(None),
        });

        // Registered before any binding so the remembered element is current
        // by the time bindings recompute.
        let weak = Rc::downgrade(&coordinator);
        let on_element = tracker.on_focused_element_change(move |focused| {
            let Some(this) = weak.upgrade() else { return };
            if let Some(element) = focused {
                if this.editables.borrow().contains_key(element) {
                    trace!(%element, "remembering last focused editable");
                    this.last_focused.set(Some(*element));
                }
            }
        });
        let weak = Rc::downgrade(&coordinator);
        let on_focused = tracker.on_is_focused_change(move |focused| {
            let Some(this) = weak.upgrade() else { return };
            if !focused {
                this.last_focused.set(None);
            }
        });
        coordinator
            .own_subscriptions
            .set(Some((on_focused, on_element)));
        coordinator
    }

    pub fn tracker(&self) -> &Rc<FocusTracker> {
        &self.tracker
    }

    /// Track a non-editable element that belongs to the editor.
    pub fn register(&self, element: ElementId) -> Result<(), UiError> {
        self.tracker.add(element)
    }

    pub fn last_focused(&self) -> Option<ElementId> {
        self.last_focused.get()
    }

    /// Forget the remembered element and refresh every bound editable.
    pub fn reset_last_focused(&self) {
        if self.last_focused.replace(None).is_some() {
            self.refresh_all();
        }
    }

    /// Drive `editable.is_focused` from the sticky rule.
    ///
    /// The element itself must be registered with the tracker separately.
    pub fn bind(self: &Rc<Self>, editable: &Rc<EditableView>) -> FocusBinding {
        let element = editable.element();
        self.editables
            .borrow_mut()
            .insert(element, Rc::downgrade(editable));

        let on_is_focused = self
            .tracker
            .on_is_focused_change(self.refresher::<bool>(editable));
        let on_focused_element = self
            .tracker
            .on_focused_element_change(self.refresher::<Option<ElementId>>(editable));
        self.refresh(editable);
        debug!(root = %editable.name(), %element, "focus bound");

        FocusBinding {
            element,
            on_is_focused,
            on_focused_element,
        }
    }

    /// Undo [`bind`](Self::bind) and stop tracking the element.
    pub fn release(&self, binding: FocusBinding) {
        let FocusBinding {
            element,
            on_is_focused,
            on_focused_element,
        } = binding;
        self.tracker.off_is_focused_change(on_is_focused);
        self.tracker.off_focused_element_change(on_focused_element);

        let removed = self.editables.borrow_mut().shift_remove(&element);
        if let Some(editable) = removed.as_ref().and_then(Weak::upgrade) {
            editable.set_focused(false);
        }
        if self.last_focused.get() == Some(element) {
            self.last_focused.set(None);
        }
        self.tracker.remove(element);
        self.refresh_all();
        debug!(%element, "focus released");
    }

    pub fn is_bound(&self, element: ElementId) -> bool {
        self.editables.borrow().contains_key(&element)
    }

    pub fn destroy(&self) {
        if let Some((on_focused, on_element)) = self.own_subscriptions.take() {
            self.tracker.off_is_focused_change(on_focused);
            self.tracker.off_focused_element_change(on_element);
        }
        self.editables.borrow_mut().clear();
        self.last_focused.set(None);
    }

    fn compute(&self, element: ElementId) -> bool {
        is_sticky_focused(
            self.tracker.is_focused(),
            self.tracker.focused_element(),
            self.last_focused.get(),
            element,
        )
    }

    fn refresh(&self, editable: &EditableView) {
        editable.set_focused(self.compute(editable.element()));
    }

    fn refresh_all(&self) {
        let editables: Vec<Rc<EditableView>> = self
            .editables
            .borrow()
            .values()
            .filter_map(Weak::upgrade)
            .collect();
        for editable in editables {
            self.refresh(&editable);
        }
    }

    fn refresher<T: 'static>(
        self: &Rc<Self>,
        editable: &Rc<EditableView>,
    ) -> impl Fn(&T) + 'static {
        let coordinator = Rc::downgrade(self);
        let editable = Rc::downgrade(editable);
        move |_: &T| {
            if let (Some(coordinator), Some(editable)) = (coordinator.upgrade(), editable.upgrade())
            {
                coordinator.refresh(&editable);
            }
        }
    }
}
