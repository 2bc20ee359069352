//! File-backed context store.
//!
//! Every context is a `context.yaml` somewhere under the workspace root. There is no
//! index: lookups walk the tree in path order and parse each document they meet.
//! Documents that fail to parse are logged and skipped, never fatal.

use crate::context::Context;
use crate::error::StorageError;
use crate::template::loader::CONTEXT_FILE_NAME;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory names never descended into
    pub ignore_dirs: Vec<String>,
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: vec![".git".to_string()],
            follow_symlinks: false,
        }
    }
}

impl ScanConfig {
    fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .ignore_dirs
                .iter()
                .any(|name| entry.file_name() == OsStr::new(name))
    }
}

/// Context store rooted at a workspace directory
pub struct ContextStore {
    workspace_root: PathBuf,
    config: ScanConfig,
}

impl ContextStore {
    /// Open (creating if needed) the store at `workspace_root`.
    pub fn new<P: AsRef<Path>>(workspace_root: P) -> Result<Self, StorageError> {
        Self::with_config(workspace_root, ScanConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(
        workspace_root: P,
        config: ScanConfig,
    ) -> Result<Self, StorageError> {
        let root = workspace_root.as_ref();
        fs::create_dir_all(root).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create workspace root {:?}: {}", root, e),
            ))
        })?;
        let workspace_root = dunce::canonicalize(root)?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Persist a context to its `storage_path`, creating parent directories.
    ///
    /// Writes go to a `.tmp` sibling first and are renamed into place.
    pub fn save_context(&self, context: &Context) -> Result<(), StorageError> {
        let path = &context.storage_path;
        if path.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath(format!(
                "context '{}' has no storage path",
                context.id
            )));
        }
        if !path.starts_with(&self.workspace_root) {
            debug!(
                id = %context.id,
                path = %path.display(),
                "Saving context outside the workspace root; scans will not see it"
            );
        }

        let yaml = serde_yaml_bw::to_string(context).map_err(|e| StorageError::Serialization {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory {:?}: {}", parent, e),
                ))
            })?;
        }

        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to write temp file {:?}: {}", temp_path, e),
            ))
        })?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file to {:?}: {}", path, e),
            ))
        })?;

        debug!(id = %context.id, path = %path.display(), "Saved context");
        Ok(())
    }

    /// Parse one document; `storage_path` is set to where it was found.
    pub fn read_document(&self, path: &Path) -> Result<Context, StorageError> {
        let content = fs::read_to_string(path)?;
        let mut context: Context =
            serde_yaml_bw::from_str(&content).map_err(|e| StorageError::Serialization {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        context.storage_path = path.to_path_buf();
        Ok(context)
    }

    /// Every parsable document under the workspace root, in path order.
    pub fn documents(&self) -> impl Iterator<Item = Context> + '_ {
        let config = &self.config;
        WalkDir::new(&self.workspace_root)
            .follow_links(config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !config.is_ignored(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable path during scan");
                    None
                }
            })
            .filter(|entry| {
                entry.file_type().is_file() && entry.file_name() == OsStr::new(CONTEXT_FILE_NAME)
            })
            .filter_map(move |entry| match self.read_document(entry.path()) {
                Ok(context) => Some(context),
                Err(e) => {
                    warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Skipping malformed context document"
                    );
                    None
                }
            })
    }

    /// All contexts under the workspace root.
    pub fn scan_all(&self) -> Vec<Context> {
        self.documents().collect()
    }

    /// First context (in path order) with matching type and id.
    pub fn load_context(&self, context_type: &str, id: &str) -> Option<Context> {
        self.documents()
            .find(|c| c.context_type == context_type && c.id == id)
    }

    /// First context (in path order) with matching id, whatever its type.
    pub fn load_context_by_id(&self, id: &str) -> Option<Context> {
        self.documents().find(|c| c.id == id)
    }

    /// All contexts of the given type.
    pub fn list_contexts(&self, context_type: &str) -> Vec<Context> {
        self.documents()
            .filter(|c| c.context_type == context_type)
            .collect()
    }

    /// First context of the given type whose `name` matches.
    pub fn find_context_by_name(&self, context_type: &str, name: &str) -> Option<Context> {
        self.documents()
            .find(|c| c.context_type == context_type && c.name.as_deref() == Some(name))
    }
}
