use std::future::Future;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use multiroot_ui::ToolbarConfig;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;

/// Editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Toolbar items, shared by every root.
    pub toolbar: ToolbarConfig,
    /// Placeholder text per root name.
    pub placeholder: IndexMap<SmolStr, String>,
    /// If set, only these plugins are loaded.
    pub plugins: Option<Vec<SmolStr>>,
    /// Plugins to leave out.
    pub remove_plugins: Vec<SmolStr>,
}

impl EditorConfig {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, ConfigError> {
        loader.load().await
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }

    /// Whether plugin `name` survives the `plugins` and `removePlugins` filters.
    pub fn allows_plugin(&self, name: &str) -> bool {
        let allowed = self
            .plugins
            .as_ref()
            .is_none_or(|plugins| plugins.iter().any(|p| p == name));
        allowed && !self.remove_plugins.iter().any(|p| p == name)
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<EditorConfig, ConfigError>>;
}

/// A [`Loader`] reading a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// The format is picked from the file extension: `.json` or `.toml`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<EditorConfig, ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => EditorConfig::from_json_str(&std::fs::read_to_string(&self.path)?),
            Some("toml") => EditorConfig::from_toml_str(&std::fs::read_to_string(&self.path)?),
            other => Err(ConfigError::UnsupportedFormat {
                extension: other.unwrap_or_default().to_owned(),
            }),
        }
    }
}
