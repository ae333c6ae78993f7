//! Root binding registry.
//!
//! Every root the UI knows about has exactly one [`RootBinding`] record
//! joining its container, editable view, focus binding and attachment state.
//! Records are keyed by root name, the same key the model and the editing
//! view use, so the three registries can be checked against each other.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use multiroot_engine::{Container, EditingView, ElementId, Emitter, Model, SubscriptionId};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::editable::EditableView;
use crate::error::UiError;
use crate::focus::{FocusBinding, FocusCoordinator, FocusTracker};
use crate::toolbar::{ComponentFactory, ToolbarConfig};
use crate::view::EditorUiView;

/// Attribute a `<textarea>` container may carry placeholder text in.
pub const PLACEHOLDER_ATTRIBUTE: &str = "placeholder";

/// Collaborators the UI binds against.
#[derive(Clone, Debug, Default)]
pub struct UiContext {
    pub model: Rc<Model>,
    pub editing: Rc<EditingView>,
    pub components: Rc<ComponentFactory>,
    pub toolbar: ToolbarConfig,
    pub placeholder: IndexMap<SmolStr, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachmentState {
    /// Editable view exists, not yet bound to focus or the editing view.
    Created,
    /// Tracked for focus and attached to the editing view.
    Bound,
    /// Unbound and detached. Terminal.
    Removed,
}

/// Everything the UI holds for one root.
#[derive(Debug)]
pub struct RootBinding {
    name: SmolStr,
    container: Container,
    editable: Rc<EditableView>,
    focus: Option<FocusBinding>,
    state: AttachmentState,
}

impl RootBinding {
    fn new(editable: Rc<EditableView>) -> Self {
        Self {
            name: SmolStr::new(editable.name()),
            container: editable.container().clone(),
            editable,
            focus: None,
            state: AttachmentState::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn editable(&self) -> &Rc<EditableView> {
        &self.editable
    }

    pub fn element(&self) -> ElementId {
        self.editable.element()
    }

    pub fn state(&self) -> AttachmentState {
        self.state
    }
}

pub struct EditorUi {
    context: UiContext,
    view: EditorUiView,
    tracker: Rc<FocusTracker>,
    focus: Rc<FocusCoordinator>,
    bindings: RefCell<IndexMap<SmolStr, RootBinding>>,
    ready: Emitter<()>,
}

impl std::fmt::Debug for EditorUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorUi")
            .field("roots", &self.root_names())
            .field("rendered", &self.view.is_rendered())
            .finish_non_exhaustive()
    }
}

impl EditorUi {
    /// Create one editable per container. Nothing is bound until [`init`](Self::init).
    pub fn new(
        context: UiContext,
        containers: &IndexMap<SmolStr, Container>,
    ) -> Result<Self, UiError> {
        let view = EditorUiView::with_containers(containers)?;
        let bindings = view
            .editables()
            .into_iter()
            .map(|editable| (SmolStr::new(editable.name()), RootBinding::new(editable)))
            .collect();
        let tracker = Rc::new(FocusTracker::new());
        let focus = FocusCoordinator::new(tracker.clone());

        Ok(Self {
            context,
            view,
            tracker,
            focus,
            bindings: RefCell::new(bindings),
            ready: Emitter::new(),
        })
    }

    /// Render the view and bind every root created so far.
    ///
    /// Model roots must already exist.
    pub fn init(&self) -> Result<(), UiError> {
        self.view.render()?;

        let names: Vec<SmolStr> = self.bindings.borrow().keys().cloned().collect();
        for name in &names {
            self.bind(name, false)?;
        }
        self.apply_placeholders(&names);
        self.init_toolbar()?;

        debug!(roots = names.len(), "ui initialized");
        self.ready.emit(&());
        Ok(())
    }

    /// Bind roots added after initialization.
    ///
    /// The whole call fails without side effects if any name is already
    /// registered or has no model root, or if a container already hosts a
    /// root.
    pub fn add(&self, containers: &IndexMap<SmolStr, Container>) -> Result<Vec<SmolStr>, UiError> {
        for name in containers.keys() {
            if self.bindings.borrow().contains_key(name) {
                return Err(UiError::DuplicateRoot { name: name.clone() });
            }
            if !self.context.model.has_root(name) {
                return Err(UiError::MissingModelRoot { name: name.clone() });
            }
        }

        let editables = self.view.add(containers)?;
        let names: Vec<SmolStr> = editables
            .into_iter()
            .map(|editable| {
                let name = SmolStr::new(editable.name());
                self.bindings
                    .borrow_mut()
                    .insert(name.clone(), RootBinding::new(editable));
                name
            })
            .collect();

        for name in &names {
            self.bind(name, true)?;
        }
        self.apply_placeholders(&names);
        debug!(roots = ?names, "ui roots added");
        Ok(names)
    }

    /// Unbind and detach root `name`, returning its final record.
    pub fn remove(&self, name: &str) -> Result<RootBinding, UiError> {
        let mut binding = self
            .bindings
            .borrow_mut()
            .shift_remove(name)
            .ok_or_else(|| UiError::UnknownRoot {
                name: SmolStr::new(name),
            })?;

        self.view.remove(name);
        self.context.editing.detach_dom_root(name);
        // The remembered element may be the one going away.
        self.focus.reset_last_focused();
        if let Some(focus) = binding.focus.take() {
            self.focus.release(focus);
        }
        binding.state = AttachmentState::Removed;

        debug!(root = %name, "ui root removed");
        Ok(binding)
    }

    /// Detach every root and tear down the view and focus tracking.
    pub fn destroy(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        for (name, mut binding) in bindings {
            self.context.editing.detach_dom_root(&name);
            if let Some(focus) = binding.focus.take() {
                self.focus.release(focus);
            }
            binding.state = AttachmentState::Removed;
        }
        self.view.destroy();
        self.focus.destroy();
        self.tracker.destroy();
        self.ready.clear();
        debug!("ui destroyed");
    }

    /// Check that records, model roots, the editing view and focus tracking agree.
    pub fn verify(&self) -> Result<(), UiError> {
        let inconsistent = |name: &SmolStr, reason| UiError::Inconsistent {
            name: name.clone(),
            reason,
        };

        for (name, binding) in self.bindings.borrow().iter() {
            if !self.context.model.has_root(name) {
                return Err(inconsistent(name, "bound without a model root"));
            }
            if self.view.editable(name).is_none() {
                return Err(inconsistent(name, "no editable view registered"));
            }
            match binding.state {
                AttachmentState::Bound => {
                    if self.context.editing.dom_root(name) != Some(binding.element()) {
                        return Err(inconsistent(name, "not attached to the editing view"));
                    }
                    if !self.tracker.contains(binding.element()) {
                        return Err(inconsistent(name, "element not focus tracked"));
                    }
                }
                AttachmentState::Created if self.view.is_rendered() => {
                    return Err(inconsistent(name, "rendered but never bound"));
                }
                AttachmentState::Created => {}
                AttachmentState::Removed => {
                    return Err(inconsistent(name, "removed record still registered"));
                }
            }
        }

        let bindings = self.bindings.borrow();
        for name in self.context.model.root_names() {
            if !bindings.contains_key(&name) {
                return Err(inconsistent(&name, "model root has no binding"));
            }
        }
        Ok(())
    }

    pub fn context(&self) -> &UiContext {
        &self.context
    }

    pub fn view(&self) -> &EditorUiView {
        &self.view
    }

    pub fn focus_tracker(&self) -> &Rc<FocusTracker> {
        &self.tracker
    }

    pub fn focus(&self) -> &Rc<FocusCoordinator> {
        &self.focus
    }

    pub fn root_names(&self) -> Vec<SmolStr> {
        self.bindings.borrow().keys().cloned().collect()
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn containers(&self) -> IndexMap<SmolStr, Container> {
        self.bindings
            .borrow()
            .iter()
            .map(|(name, binding)| (name.clone(), binding.container.clone()))
            .collect()
    }

    pub fn container(&self, name: &str) -> Option<Container> {
        self.bindings
            .borrow()
            .get(name)
            .map(|binding| binding.container.clone())
    }

    pub fn editable(&self, name: &str) -> Option<Rc<EditableView>> {
        self.bindings
            .borrow()
            .get(name)
            .map(|binding| binding.editable.clone())
    }

    pub fn state(&self, name: &str) -> Option<AttachmentState> {
        self.bindings.borrow().get(name).map(RootBinding::state)
    }

    pub fn bound_roots(&self) -> Vec<SmolStr> {
        self.bindings
            .borrow()
            .iter()
            .filter(|(_, binding)| binding.state == AttachmentState::Bound)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Sticky focus state of root `name`.
    pub fn is_focused(&self, name: &str) -> Option<bool> {
        self.bindings
            .borrow()
            .get(name)
            .map(|binding| binding.editable.is_focused())
    }

    /// Name of the root whose editable was focused last, if focus is still
    /// within the editor.
    pub fn last_focused_root(&self) -> Option<SmolStr> {
        let element = self.focus.last_focused()?;
        self.bindings
            .borrow()
            .iter()
            .find(|(_, binding)| binding.element() == element)
            .map(|(name, _)| name.clone())
    }

    pub fn on_ready(&self, listener: impl Fn(&()) + 'static) -> SubscriptionId {
        self.ready.subscribe(listener)
    }

    fn bind(&self, name: &SmolStr, tolerate_tracked: bool) -> Result<(), UiError> {
        if !self.context.model.has_root(name) {
            return Err(UiError::MissingModelRoot { name: name.clone() });
        }
        let editable = self
            .editable(name)
            .ok_or_else(|| UiError::UnknownRoot { name: name.clone() })?;
        let element = editable.element();

        match self.tracker.add(element) {
            Ok(()) => {}
            Err(UiError::AlreadyTracked { element }) if tolerate_tracked => {
                warn!(root = %name, %element, "element already focus tracked, reusing");
            }
            Err(err) => return Err(err),
        }
        let focus = self.focus.bind(&editable);
        self.context.editing.attach_dom_root(element, name);

        if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
            binding.focus = Some(focus);
            binding.state = AttachmentState::Bound;
        }
        debug!(root = %name, %element, "root bound");
        Ok(())
    }

    fn apply_placeholders(&self, names: &[SmolStr]) {
        for name in names {
            let Some(container) = self.container(name) else {
                continue;
            };
            let text = self
                .context
                .placeholder
                .get(name)
                .filter(|text| !text.is_empty())
                .cloned()
                .or_else(|| {
                    container
                        .is_textarea()
                        .then(|| container.attribute(PLACEHOLDER_ATTRIBUTE))
                        .flatten()
                        .map(|text| text.to_string())
                });
            if let Some(text) = text {
                self.context.editing.enable_placeholder(name, text);
            }
        }
    }

    fn init_toolbar(&self) -> Result<(), UiError> {
        let toolbar = self.view.toolbar();
        toolbar.fill_from_config(&self.context.toolbar, &self.context.components);
        self.focus.register(toolbar.element())
    }
}
