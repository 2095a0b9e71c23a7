//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Local config: `<work_dir>/.orgtree.toml`
//! 4. Environment variables: `ORGTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::DocumentPaths;
use crate::application::ApplicationError;
use crate::domain::EditorOptions;

/// Raw editor options; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawEditorOptions {
    pub allow_root_parent: Option<bool>,
    pub strict_remove: Option<bool>,
    pub refresh_manager_names: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub forest_file: Option<PathBuf>,
    pub directory_file: Option<PathBuf>,
    #[serde(default)]
    pub editor: RawEditorOptions,
}

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Nested organization forest (JSON)
    pub forest_file: PathBuf,
    /// Employee directory used for manager names (JSON)
    pub directory_file: PathBuf,
    /// Editor policy switches
    pub editor: EditorOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            forest_file: PathBuf::from("organizations.json"),
            directory_file: PathBuf::from("employees.json"),
            editor: EditorOptions::default(),
        }
    }
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(".orgtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl EditorOptions {
    /// Overlay wins where specified.
    pub fn merge(&self, overlay: &RawEditorOptions) -> Self {
        Self {
            allow_root_parent: overlay.allow_root_parent.unwrap_or(self.allow_root_parent),
            strict_remove: overlay.strict_remove.unwrap_or(self.strict_remove),
            refresh_manager_names: overlay
                .refresh_manager_names
                .unwrap_or(self.refresh_manager_names),
        }
    }
}

impl Settings {
    /// Document locations for the organization service.
    pub fn document_paths(&self) -> DocumentPaths {
        DocumentPaths {
            forest_file: self.forest_file.clone(),
            directory_file: self.directory_file.clone(),
        }
    }

    fn expand_paths(&mut self) {
        self.forest_file = expand_path(&self.forest_file);
        self.directory_file = expand_path(&self.directory_file);
    }

    /// Merge overlay config onto self (base); overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            forest_file: overlay
                .forest_file
                .clone()
                .unwrap_or_else(|| self.forest_file.clone()),
            directory_file: overlay
                .directory_file
                .clone()
                .unwrap_or_else(|| self.directory_file.clone()),
            editor: self.editor.merge(&overlay.editor),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Optional directory searched for a local `.orgtree.toml`
    pub fn load(work_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = work_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ORGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("forest_file") {
            settings.forest_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("directory_file") {
            settings.directory_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("editor.allow_root_parent") {
            settings.editor.allow_root_parent = val;
        }
        if let Ok(val) = config.get_bool("editor.strict_remove") {
            settings.editor.strict_remove = val;
        }
        if let Ok(val) = config.get_bool("editor.refresh_manager_names") {
            settings.editor.refresh_manager_names = val;
        }

        Ok(settings)
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
