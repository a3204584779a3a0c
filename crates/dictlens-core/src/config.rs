//! Configuration schema (dictlens.toml)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::dictionary::EdgeDirection;

/// Where dictionary documents are fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A local directory of `<version>.json` files
    #[default]
    Directory,

    /// The submission server's dictionary web service
    Http,
}

/// Dictionary source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Directory holding dictionary documents (directory sources)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Server base URL (http sources)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Directory,
            path: Some(PathBuf::from("dictionaries")),
            base_url: None,
        }
    }
}

/// Submission service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Server base URL, e.g. `https://submissions.example.org`
    pub base_url: String,

    /// Environment variable holding the authorization token
    #[serde(default)]
    pub auth_token_env: Option<String>,
}

impl SubmissionConfig {
    /// Resolve the authorization token from the environment, if configured
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
    }
}

fn default_root() -> String {
    "donor".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root file type of the relation tree
    #[serde(default = "default_root")]
    pub root: String,

    /// How relation edges map onto the tree
    #[serde(default)]
    pub direction: EdgeDirection,

    /// Display order of file types
    #[serde(default)]
    pub sorting_order: Vec<String>,

    /// Dictionary source
    #[serde(default)]
    pub source: SourceConfig,

    /// Submission service (optional)
    #[serde(default)]
    pub submission: Option<SubmissionConfig>,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            direction: EdgeDirection::default(),
            sorting_order: Vec::new(),
            source: SourceConfig::default(),
            submission: None,
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Dictionary directory, resolved against the project root
    pub fn dictionary_dir(&self) -> Option<PathBuf> {
        self.source.path.as_ref().map(|p| {
            if p.is_relative() {
                self.project_root.join(p)
            } else {
                p.clone()
            }
        })
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
