//! Editor plugins.
//!
//! Plugins initialize before the UI so the components they register are
//! available when the toolbar is filled.

use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use indexmap::IndexMap;
use multiroot_engine::Model;
use multiroot_ui::ComponentFactory;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::error::EditorError;

/// What a plugin gets to work with during initialization.
#[derive(Clone, Debug)]
pub struct PluginContext {
    pub model: Rc<Model>,
    pub components: Rc<ComponentFactory>,
}

pub trait Plugin {
    /// Unique plugin name, matched against `plugins` and `removePlugins`.
    fn name(&self) -> &str;

    fn init<'a>(
        &'a self,
        context: &'a PluginContext,
    ) -> LocalBoxFuture<'a, Result<(), EditorError>>;

    /// Runs once the editor is ready.
    fn after_ready(&self) {}

    fn destroy(&self) {}
}

/// The plugins an editor instance loaded, in load order.
#[derive(Default)]
pub struct PluginCollection {
    plugins: IndexMap<SmolStr, Rc<dyn Plugin>>,
}

impl std::fmt::Debug for PluginCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.plugins.keys()).finish()
    }
}

impl PluginCollection {
    /// Apply the config's plugin filters to `available`.
    pub fn resolve(available: Vec<Rc<dyn Plugin>>, config: &EditorConfig) -> Self {
        let mut plugins: IndexMap<SmolStr, Rc<dyn Plugin>> = IndexMap::new();
        for plugin in available {
            let name = SmolStr::new(plugin.name());
            if !config.allows_plugin(&name) {
                debug!(plugin = %name, "plugin disabled by configuration");
                continue;
            }
            if plugins.contains_key(&name) {
                warn!(plugin = %name, "plugin listed twice, keeping the first");
                continue;
            }
            plugins.insert(name, plugin);
        }
        Self { plugins }
    }

    pub fn names(&self) -> Vec<SmolStr> {
        self.plugins.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Initialize plugins one after another, stopping at the first failure.
    pub async fn init_all(&self, context: &PluginContext) -> Result<(), EditorError> {
        for (name, plugin) in &self.plugins {
            debug!(plugin = %name, "initializing plugin");
            plugin.init(context).await?;
        }
        Ok(())
    }

    pub fn after_ready_all(&self) {
        for plugin in self.plugins.values() {
            plugin.after_ready();
        }
    }

    /// Destroy plugins in reverse load order.
    pub fn destroy_all(&self) {
        for (name, plugin) in self.plugins.iter().rev() {
            debug!(plugin = %name, "destroying plugin");
            plugin.destroy();
        }
    }
}

fn register_buttons<'a>(
    context: &'a PluginContext,
    buttons: &'static [(&'static str, &'static str)],
) -> LocalBoxFuture<'a, Result<(), EditorError>> {
    async move {
        for (name, label) in buttons {
            context.components.add(*name, *label)?;
        }
        Ok::<_, EditorError>(())
    }
    .boxed_local()
}

/// Bold, italic, underline and code buttons.
#[derive(Debug, Default)]
pub struct BasicStyles;

impl Plugin for BasicStyles {
    fn name(&self) -> &str {
        "BasicStyles"
    }

    fn init<'a>(
        &'a self,
        context: &'a PluginContext,
    ) -> LocalBoxFuture<'a, Result<(), EditorError>> {
        register_buttons(
            context,
            &[
                ("bold", "Bold"),
                ("italic", "Italic"),
                ("underline", "Underline"),
                ("code", "Code"),
            ],
        )
    }
}

/// Block quote button.
#[derive(Debug, Default)]
pub struct BlockQuote;

impl Plugin for BlockQuote {
    fn name(&self) -> &str {
        "BlockQuote"
    }

    fn init<'a>(
        &'a self,
        context: &'a PluginContext,
    ) -> LocalBoxFuture<'a, Result<(), EditorError>> {
        register_buttons(context, &[("blockQuote", "Block quote")])
    }
}

/// Plugins loaded by [`MultiRootEditor::create`](crate::MultiRootEditor::create).
pub fn builtin_plugins() -> Vec<Rc<dyn Plugin>> {
    vec![Rc::new(BasicStyles) as Rc<dyn Plugin>, Rc::new(BlockQuote)]
}
