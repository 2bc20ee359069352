//! Configuration System
//!
//! Layered configuration for the context store: where templates live, where context
//! instances are stored, how scans and traversals behave, and how logging is set up.
//! Sources are merged with the `config` crate; see [`ConfigLoader`] for precedence.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratumConfig {
    /// Directory holding `types/<type>/context.yaml` templates
    #[serde(default = "default_template_root")]
    pub template_root: PathBuf,

    /// Directory under which context instances are stored
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Context store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Relationship graph traversal settings
    #[serde(default)]
    pub traversal: TraversalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Context store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory names skipped by recursive scans
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

/// Traversal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Depth used when a graph query does not specify one
    #[serde(default = "default_depth")]
    pub default_depth: usize,
}

fn default_template_root() -> PathBuf {
    PathBuf::from("contexts")
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".stratum")
}

fn default_ignore_dirs() -> Vec<String> {
    vec![".git".to_string()]
}

fn default_depth() -> usize {
    2
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
        }
    }
}

impl Default for StratumConfig {
    fn default() -> Self {
        Self {
            template_root: default_template_root(),
            workspace_root: default_workspace_root(),
            store: StoreConfig::default(),
            traversal: TraversalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StratumConfig {
    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.template_root.as_os_str().is_empty() {
            errors.push("Template root cannot be empty".to_string());
        }
        if self.workspace_root.as_os_str().is_empty() {
            errors.push("Workspace root cannot be empty".to_string());
        }
        if self.traversal.default_depth == 0 {
            errors.push("Traversal default_depth must be at least 1".to_string());
        }
        if self.store.ignore_dirs.iter().any(|d| d.is_empty()) {
            errors.push("Store ignore_dirs cannot contain empty names".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and convert problems into a single [`ApiError::ConfigError`].
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        })
    }

    /// Resolve template and workspace roots against a project directory.
    ///
    /// Returns `(template_root, workspace_root)`; absolute roots are kept as-is.
    pub fn resolve_roots(&self, project_root: &Path) -> (PathBuf, PathBuf) {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                project_root.join(p)
            }
        };
        (resolve(&self.template_root), resolve(&self.workspace_root))
    }
}
