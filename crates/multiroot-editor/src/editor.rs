//! The multi-root editor session.
//!
//! A session hosts any number of named roots, each rendered into a
//! caller-owned [`Container`]. Roots come and go at runtime while the
//! document model, the toolbar and focus tracking stay shared.
//!
//! The root name joins three registries: the model's roots, the UI's root
//! bindings (which also hold the containers), and the editing view's DOM
//! roots. Every public operation leaves them agreeing with each other;
//! [`MultiRootEditor::check_consistency`] verifies it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use multiroot_engine::{
    Container, DataController, EditingView, Model, ModelError, Position, ROOT_ELEMENT_TYPE,
    RootElement, SchemaContext, SubscriptionId,
};
use multiroot_ui::{ComponentFactory, EditorUi, UiContext};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::phase::PhaseRunner;
use crate::plugin::{Plugin, PluginCollection, PluginContext, builtin_plugins};

/// Serialized data of several roots, keyed by root name.
pub type RootsData = IndexMap<SmolStr, String>;

/// Which roots [`MultiRootEditor::get_data`] reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DataSelector {
    /// Every root.
    #[default]
    All,
    /// The named roots, as a map.
    Roots(Vec<SmolStr>),
    /// One root, as a bare string.
    Root(SmolStr),
}

impl From<&str> for DataSelector {
    /// An empty name selects every root.
    fn from(name: &str) -> Self {
        if name.is_empty() {
            Self::All
        } else {
            Self::Root(SmolStr::new(name))
        }
    }
}

impl From<SmolStr> for DataSelector {
    fn from(name: SmolStr) -> Self {
        Self::from(name.as_str())
    }
}

impl<S: Into<SmolStr>> From<Vec<S>> for DataSelector {
    fn from(names: Vec<S>) -> Self {
        Self::Roots(names.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<SmolStr>, const N: usize> From<[S; N]> for DataSelector {
    fn from(names: [S; N]) -> Self {
        Self::Roots(names.into_iter().map(Into::into).collect())
    }
}

/// Result of [`MultiRootEditor::get_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorData {
    Roots(RootsData),
    Root(String),
}

impl EditorData {
    pub fn as_root(&self) -> Option<&str> {
        match self {
            Self::Root(data) => Some(data),
            Self::Roots(_) => None,
        }
    }

    pub fn as_roots(&self) -> Option<&RootsData> {
        match self {
            Self::Roots(data) => Some(data),
            Self::Root(_) => None,
        }
    }

    pub fn into_roots(self) -> Option<RootsData> {
        match self {
            Self::Roots(data) => Some(data),
            Self::Root(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Initializing,
    Ready,
    Destroyed,
}

struct EditorInner {
    config: EditorConfig,
    model: Rc<Model>,
    editing: Rc<EditingView>,
    data: DataController,
    components: Rc<ComponentFactory>,
    ui: EditorUi,
    plugins: PluginCollection,
    state: Cell<EditorState>,
}

impl EditorInner {
    fn plugin_context(&self) -> PluginContext {
        PluginContext {
            model: self.model.clone(),
            components: self.components.clone(),
        }
    }

    async fn init_plugins(&self) -> Result<(), EditorError> {
        self.plugins.init_all(&self.plugin_context()).await
    }

    fn init_ui(&self) -> Result<(), EditorError> {
        Ok(self.ui.init()?)
    }

    /// Load each container's content into its model root.
    fn init_data(&self) -> Result<(), EditorError> {
        let initial: RootsData = self
            .ui
            .containers()
            .into_iter()
            .map(|(name, container)| (name, container.data()))
            .collect();
        Ok(self.data.init(&self.model, &initial)?)
    }

    fn fire_ready(&self) -> Result<(), EditorError> {
        self.state.set(EditorState::Ready);
        self.plugins.after_ready_all();
        debug!(roots = ?self.ui.root_names(), "editor ready");
        Ok(())
    }

    fn root_data(&self, name: &str) -> Result<String, EditorError> {
        if !self.ui.has_root(name) {
            return Err(EditorError::root_not_found(name));
        }
        Ok(self.data.get(&self.model, name)?)
    }

    fn all_data(&self) -> Result<RootsData, EditorError> {
        self.ui
            .root_names()
            .into_iter()
            .map(|name| -> Result<(SmolStr, String), EditorError> {
                let data = self.root_data(&name)?;
                Ok((name, data))
            })
            .collect()
    }

    /// Capture what destroy writes back: each bound root's data and container.
    fn capture(&self) -> Result<Vec<(Container, String)>, EditorError> {
        self.ui
            .bound_roots()
            .into_iter()
            .filter_map(|name| self.ui.container(&name).map(|container| (name, container)))
            .map(|(name, container)| -> Result<(Container, String), EditorError> {
                Ok((container, self.root_data(&name)?))
            })
            .collect()
    }

    fn teardown_ui(&self) -> Result<(), EditorError> {
        self.ui.destroy();
        Ok(())
    }

    fn teardown_engine(&self) -> Result<(), EditorError> {
        self.plugins.destroy_all();
        self.editing.destroy();
        self.model.destroy()?;
        Ok(())
    }
}

/// State threaded through the destroy phases.
#[derive(Clone)]
struct Teardown {
    inner: Rc<EditorInner>,
    captured: Rc<RefCell<Vec<(Container, String)>>>,
}

impl Teardown {
    fn capture(&self) -> Result<(), EditorError> {
        let captured = self.inner.capture()?;
        debug!(roots = captured.len(), "captured root data");
        *self.captured.borrow_mut() = captured;
        Ok(())
    }

    /// Write captured data back into the containers.
    fn restore(&self) -> Result<(), EditorError> {
        for (container, data) in self.captured.take() {
            container.set_data(&data);
        }
        Ok(())
    }
}

/// An editing session over a dynamic set of roots.
#[derive(Clone)]
pub struct MultiRootEditor {
    inner: Rc<EditorInner>,
}

impl std::fmt::Debug for MultiRootEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiRootEditor")
            .field("state", &self.inner.state.get())
            .field("roots", &self.inner.ui.root_names())
            .field("plugins", &self.inner.plugins)
            .finish_non_exhaustive()
    }
}

impl MultiRootEditor {
    /// Create an editor over `containers` with the builtin plugins.
    pub async fn create(
        containers: IndexMap<SmolStr, Container>,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        Self::create_with_plugins(containers, config, builtin_plugins()).await
    }

    /// Create an editor with an explicit plugin list.
    ///
    /// Runs, in order: plugin initialization, UI initialization, loading each
    /// container's content, and the ready signal. The first failing phase
    /// aborts creation.
    pub async fn create_with_plugins(
        containers: IndexMap<SmolStr, Container>,
        config: EditorConfig,
        plugins: Vec<Rc<dyn Plugin>>,
    ) -> Result<Self, EditorError> {
        let editor = Self::new(&containers, config, plugins)?;

        PhaseRunner::<Rc<EditorInner>, EditorError>::new("create")
            .phase("init-plugins", |inner| async move { inner.init_plugins().await })
            .phase("init-ui", |inner| async move { inner.init_ui() })
            .phase("init-data", |inner| async move { inner.init_data() })
            .phase("ready", |inner| async move { inner.fire_ready() })
            .run(editor.inner.clone())
            .await?;

        Ok(editor)
    }

    /// Construct the session and one model root per container.
    fn new(
        containers: &IndexMap<SmolStr, Container>,
        config: EditorConfig,
        plugins: Vec<Rc<dyn Plugin>>,
    ) -> Result<Self, EditorError> {
        let model = Rc::new(Model::new());
        for name in containers.keys() {
            model.create_root(ROOT_ELEMENT_TYPE, name)?;
        }
        let editing = Rc::new(EditingView::new());
        let components = Rc::new(ComponentFactory::new());
        let ui = EditorUi::new(
            UiContext {
                model: model.clone(),
                editing: editing.clone(),
                components: components.clone(),
                toolbar: config.toolbar.clone(),
                placeholder: config.placeholder.clone(),
            },
            containers,
        )?;
        let plugins = PluginCollection::resolve(plugins, &config);
        debug!(roots = containers.len(), plugins = ?plugins, "editor constructed");

        Ok(Self {
            inner: Rc::new(EditorInner {
                config,
                model,
                editing,
                data: DataController::default(),
                components,
                ui,
                plugins,
                state: Cell::new(EditorState::Initializing),
            }),
        })
    }

    /// Add roots rendered into `containers`, loading their current content.
    ///
    /// Fails without side effects if any name already exists.
    pub fn add(&self, containers: IndexMap<SmolStr, Container>) -> Result<(), EditorError> {
        self.ensure_alive()?;
        let model = &self.inner.model;
        if let Some(name) = containers
            .keys()
            .find(|name| model.has_root(name) || self.inner.ui.has_root(name))
        {
            return Err(ModelError::DuplicateRoot { name: name.clone() }.into());
        }

        let mut created = Vec::with_capacity(containers.len());
        let bound = containers
            .keys()
            .try_for_each(|name| {
                model.create_root(ROOT_ELEMENT_TYPE, name)?;
                created.push(name.clone());
                Ok::<_, EditorError>(())
            })
            .and_then(|()| self.inner.ui.add(&containers).map_err(EditorError::from));
        if let Err(err) = bound {
            for name in &created {
                if let Err(rollback) = model.detach_root(name) {
                    warn!(root = %name, error = %rollback, "failed to roll back model root");
                }
            }
            return Err(err);
        }

        let initial: RootsData = containers
            .iter()
            .map(|(name, container)| (name.clone(), container.data()))
            .collect();
        self.inner.data.init(model, &initial)?;
        debug!(roots = ?created, version = model.version(), "roots added");
        Ok(())
    }

    /// Remove root `name`, writing its final content back into its container.
    ///
    /// Returns the detached model root. Bumps the document version by one.
    pub fn remove(&self, name: &str) -> Result<RootElement, EditorError> {
        self.ensure_known(name)?;
        let data = self.inner.root_data(name)?;

        let binding = self.inner.ui.remove(name)?;
        let root = self.inner.model.detach_root(name)?;
        binding.container().set_data(&data);
        let version = self.inner.model.bump_version()?;

        debug!(root = %name, version, "root removed");
        Ok(root)
    }

    /// Replace the content of root `name`.
    pub fn set_data(&self, name: &str, data: &str) -> Result<(), EditorError> {
        self.ensure_known(name)?;
        let fragment = self.inner.data.parse(data, SchemaContext::Root);
        let root = SmolStr::new(name);
        self.inner.model.enqueue_change(move |writer| {
            let range = writer.create_range_in(&root)?;
            writer.remove(range)?;
            writer.insert(fragment, &root, Position::End)
        })?;
        Ok(())
    }

    /// Insert content at the start of root `name`.
    pub fn append_data_in_first(&self, name: &str, data: &str) -> Result<(), EditorError> {
        self.insert_data(name, data, Position::Offset(0))
    }

    /// Insert content at the end of root `name`.
    pub fn append_data(&self, name: &str, data: &str) -> Result<(), EditorError> {
        self.insert_data(name, data, Position::End)
    }

    fn insert_data(&self, name: &str, data: &str, position: Position) -> Result<(), EditorError> {
        self.ensure_known(name)?;
        let fragment = self.inner.data.parse(data, SchemaContext::Root);
        let root = SmolStr::new(name);
        self.inner
            .model
            .enqueue_change(move |writer| writer.insert(fragment, &root, position))?;
        Ok(())
    }

    /// Serialized content of the selected roots.
    pub fn get_data(&self, selector: impl Into<DataSelector>) -> Result<EditorData, EditorError> {
        self.ensure_alive()?;
        match selector.into() {
            DataSelector::All => self.inner.all_data().map(EditorData::Roots),
            DataSelector::Roots(names) => names
                .into_iter()
                .map(|name| -> Result<(SmolStr, String), EditorError> {
                    let data = self.inner.root_data(&name)?;
                    Ok((name, data))
                })
                .collect::<Result<RootsData, EditorError>>()
                .map(EditorData::Roots),
            DataSelector::Root(name) => self.inner.root_data(&name).map(EditorData::Root),
        }
    }

    /// Serialized content of root `name`.
    pub fn root_data(&self, name: &str) -> Result<String, EditorError> {
        self.ensure_alive()?;
        self.inner.root_data(name)
    }

    /// Serialized content of every root.
    pub fn all_data(&self) -> Result<RootsData, EditorError> {
        self.ensure_alive()?;
        self.inner.all_data()
    }

    /// Call `listener` with every root's data after each committed change.
    pub fn on_change(
        &self,
        listener: impl Fn(&RootsData) + 'static,
    ) -> Result<SubscriptionId, EditorError> {
        self.ensure_alive()?;
        let inner: Weak<EditorInner> = Rc::downgrade(&self.inner);
        Ok(self.inner.model.on_change_data(move |version| {
            let Some(inner) = inner.upgrade() else { return };
            match inner.all_data() {
                Ok(data) => listener(&data),
                Err(err) => warn!(version, error = %err, "skipping change listener"),
            }
        }))
    }

    /// Stop a listener registered with [`on_change`](Self::on_change).
    pub fn off_change(&self, id: SubscriptionId) -> bool {
        self.inner.model.off_change_data(id)
    }

    /// Tear the editor down, leaving each container with its root's final content.
    ///
    /// Data is captured before anything is torn down and written back only
    /// once teardown finished.
    pub async fn destroy(&self) -> Result<(), EditorError> {
        self.ensure_alive()?;
        self.inner.state.set(EditorState::Destroyed);

        let teardown = Teardown {
            inner: self.inner.clone(),
            captured: Rc::default(),
        };
        PhaseRunner::<Teardown, EditorError>::new("destroy")
            .phase("capture", |t| async move { t.capture() })
            .phase("teardown-ui", |t| async move { t.inner.teardown_ui() })
            .phase("teardown-engine", |t| async move { t.inner.teardown_engine() })
            .phase("restore-data", |t| async move { t.restore() })
            .run(teardown)
            .await
    }

    /// Check that containers, model roots and UI bindings agree.
    pub fn check_consistency(&self) -> Result<(), EditorError> {
        self.ensure_alive()?;
        self.inner.ui.verify()?;
        Ok(())
    }

    pub fn state(&self) -> EditorState {
        self.inner.state.get()
    }

    pub fn version(&self) -> u64 {
        self.inner.model.version()
    }

    pub fn root_names(&self) -> Vec<SmolStr> {
        self.inner.ui.root_names()
    }

    pub fn has_root(&self, name: &str) -> bool {
        self.inner.ui.has_root(name)
    }

    pub fn containers(&self) -> IndexMap<SmolStr, Container> {
        self.inner.ui.containers()
    }

    /// Sticky focus state of root `name`.
    pub fn is_focused(&self, name: &str) -> Option<bool> {
        self.inner.ui.is_focused(name)
    }

    pub fn last_focused_root(&self) -> Option<SmolStr> {
        self.inner.ui.last_focused_root()
    }

    pub fn ui(&self) -> &EditorUi {
        &self.inner.ui
    }

    pub fn model(&self) -> &Rc<Model> {
        &self.inner.model
    }

    pub fn editing(&self) -> &Rc<EditingView> {
        &self.inner.editing
    }

    pub fn components(&self) -> &Rc<ComponentFactory> {
        &self.inner.components
    }

    pub fn plugins(&self) -> &PluginCollection {
        &self.inner.plugins
    }

    pub fn config(&self) -> &EditorConfig {
        &self.inner.config
    }

    pub fn data_controller(&self) -> &DataController {
        &self.inner.data
    }

    fn ensure_alive(&self) -> Result<(), EditorError> {
        match self.inner.state.get() {
            EditorState::Destroyed => Err(EditorError::Destroyed),
            _ => Ok(()),
        }
    }

    fn ensure_known(&self, name: &str) -> Result<(), EditorError> {
        self.ensure_alive()?;
        if !self.inner.ui.has_root(name) {
            return Err(EditorError::root_not_found(name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_conversions() {
        assert_eq!(DataSelector::from(""), DataSelector::All);
        assert_eq!(DataSelector::from("a"), DataSelector::Root("a".into()));
        assert_eq!(
            DataSelector::from(["a", "b"]),
            DataSelector::Roots(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            DataSelector::from(Vec::<String>::new()),
            DataSelector::Roots(Vec::new())
        );
    }

    #[test]
    fn test_editor_data_accessors() {
        let root = EditorData::Root("<p>x</p>".to_owned());
        assert_eq!(root.as_root(), Some("<p>x</p>"));
        assert!(root.as_roots().is_none());

        let roots = EditorData::Roots(RootsData::new());
        assert!(roots.as_root().is_none());
        assert_eq!(roots.into_roots(), Some(RootsData::new()));
    }
}
