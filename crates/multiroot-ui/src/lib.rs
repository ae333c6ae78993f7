//! UI layer for the multi-root editor.
//!
//! # Architecture
//!
//! - `focus`: focus tracking and the sticky-focus coordinator
//! - `editable`: one editable view per root
//! - `view`: the render-once view hierarchy (toolbar + editables)
//! - `toolbar`: toolbar items and the component factory
//! - `ui`: the root binding registry tying roots, views and focus together
//!
//! # Re-exports
//!
//! This crate re-exports `multiroot-engine` for convenience.

pub use multiroot_engine;

pub mod editable;
pub mod error;
pub mod focus;
pub mod toolbar;
pub mod ui;
pub mod view;

pub use editable::EditableView;
pub use error::UiError;
pub use focus::{FocusBinding, FocusCoordinator, FocusTracker, is_sticky_focused};
pub use toolbar::{ButtonView, ComponentFactory, ToolbarConfig, ToolbarItem, ToolbarView};
pub use ui::{AttachmentState, EditorUi, RootBinding, UiContext};
pub use view::EditorUiView;
