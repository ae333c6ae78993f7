//! Error types for the editor session.

use miette::Diagnostic;
use multiroot_engine::ModelError;
use multiroot_ui::UiError;
use smol_str::SmolStr;

/// Main error type for editor operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum EditorError {
    /// The session has no root with this name.
    #[error("root `{name}` not found")]
    #[diagnostic(
        code(multiroot::editor::root_not_found),
        help("add the root first, or check `root_names()`")
    )]
    RootNotFound { name: SmolStr },

    /// Document model error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    /// UI binding error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ui(#[from] UiError),

    /// Configuration error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// A plugin failed to initialize or tear down.
    #[error("plugin `{name}` failed: {message}")]
    #[diagnostic(code(multiroot::editor::plugin))]
    Plugin { name: SmolStr, message: String },

    /// The editor was destroyed.
    #[error("the editor has been destroyed")]
    #[diagnostic(code(multiroot::editor::destroyed))]
    Destroyed,
}

impl EditorError {
    pub fn plugin(name: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Self::Plugin {
            name: name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn root_not_found(name: &str) -> Self {
        Self::RootNotFound {
            name: SmolStr::new(name),
        }
    }
}

/// Errors loading an [`EditorConfig`](crate::EditorConfig).
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read configuration file")]
    #[diagnostic(code(multiroot::config::io))]
    Io(#[from] std::io::Error),

    #[error("invalid JSON configuration")]
    #[diagnostic(code(multiroot::config::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML configuration")]
    #[diagnostic(code(multiroot::config::toml))]
    Toml(#[from] toml::de::Error),

    #[error("unsupported configuration format `{extension}`")]
    #[diagnostic(
        code(multiroot::config::unsupported_format),
        help("use a .json or .toml file")
    )]
    UnsupportedFormat { extension: String },
}
