use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::ConflictPolicy;

/// Longest target file path copied before skipping with a warning
pub const DEFAULT_MAX_FILE_PATH: usize = 259;
/// Longest target folder path entered before skipping; leaves room for child names
pub const DEFAULT_MAX_FOLDER_PATH: usize = 247;
const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CONFIG_FILE: &str = "pastetree_config.json";

#[inline]
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[inline]
fn default_max_file_path() -> usize {
    DEFAULT_MAX_FILE_PATH
}

#[inline]
fn default_max_folder_path() -> usize {
    DEFAULT_MAX_FOLDER_PATH
}

/// Paste configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional trace log directory (if None, only console logging)
    #[serde(default)]
    pub log_directory: Option<PathBuf>,

    /// Log file rotation strategy
    #[serde(default)]
    pub log_rotation: LogRotation,

    /// How conflicts are answered before any prompt is shown
    #[serde(default)]
    pub on_conflict: ConflictPolicy,

    /// Legacy path-length ceilings
    #[serde(default)]
    pub limits: PathLimits,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_directory: None,
            log_rotation: LogRotation::default(),
            on_conflict: ConflictPolicy::default(),
            limits: PathLimits::default(),
        }
    }
}

impl PasteConfig {
    /// Load from `path`; a missing file is an error
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: PasteConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default file if present, else built-in defaults
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path).await;
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if tokio::fs::try_exists(default_path).await.unwrap_or(false) {
            return Self::load(default_path).await;
        }

        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        self.limits.validate()
    }
}

/// Log file rotation strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate daily
    #[default]
    Daily,
    /// Rotate hourly
    Hourly,
    /// Never rotate (single file)
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLimits {
    #[serde(default = "default_max_file_path")]
    pub max_file_path: usize,

    #[serde(default = "default_max_folder_path")]
    pub max_folder_path: usize,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self {
            max_file_path: DEFAULT_MAX_FILE_PATH,
            max_folder_path: DEFAULT_MAX_FOLDER_PATH,
        }
    }
}

impl PathLimits {
    pub fn validate(&self) -> Result<()> {
        if self.max_file_path == 0 || self.max_folder_path == 0 {
            bail!("Path limits must be greater than zero");
        }
        if self.max_folder_path > self.max_file_path {
            bail!(
                "Folder path limit ({}) cannot exceed file path limit ({})",
                self.max_folder_path,
                self.max_file_path
            );
        }
        Ok(())
    }
}
