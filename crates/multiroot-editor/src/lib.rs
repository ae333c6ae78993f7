//! multiroot-editor: an editing session over a dynamic set of editable roots.
//!
//! This crate provides:
//! - `MultiRootEditor` - create, add, remove, data access and teardown of roots
//! - `EditorConfig` - serde configuration with JSON/TOML file loading
//! - `Plugin` - async plugin hooks plus the builtin `BasicStyles` and `BlockQuote`
//! - `PhaseRunner` - ordered fallible async phases used by create and destroy
//! - `telemetry` - console tracing setup (behind the `telemetry` feature)
//!
//! # Example
//!
//! ```ignore
//! let containers = IndexMap::from([
//!     (SmolStr::new("header"), Container::with_content("div", "<div>H</div>")),
//! ]);
//! let editor = MultiRootEditor::create(containers, EditorConfig::default()).await?;
//! editor.set_data("header", "<p>X</p>")?;
//! let removed = editor.remove("header")?;
//! ```

pub use multiroot_engine;
pub use multiroot_ui;

pub mod config;
pub mod editor;
pub mod error;
pub mod phase;
pub mod plugin;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use config::{EditorConfig, FileStore, Loader};
pub use editor::{DataSelector, EditorData, EditorState, MultiRootEditor, RootsData};
pub use error::{ConfigError, EditorError};
pub use multiroot_engine::{Container, RootElement, SmolStr, SubscriptionId};
pub use phase::PhaseRunner;
pub use plugin::{BasicStyles, BlockQuote, Plugin, PluginCollection, PluginContext, builtin_plugins};
