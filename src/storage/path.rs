//! Storage path calculation.
//!
//! A template's `structure_config.storage_pattern` selects how a new context's
//! document path is derived:
//!
//! - `hierarchical`: `path_template` resolved under the parent's directory, or under
//!   the workspace root for root-level contexts
//! - `flat`: `path_template` always resolved under the workspace root
//! - `mixed`, `emergent`: currently laid out hierarchically
//!
//! Unknown pattern names fall back to `hierarchical`. Every path ends in `context.yaml`.

use crate::context::{fallback_label, ContextConfig};
use crate::error::StorageError;
use crate::template::loader::CONTEXT_FILE_NAME;
use crate::template::StructureConfig;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Storage layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoragePattern {
    #[default]
    Hierarchical,
    Flat,
    Mixed,
    Emergent,
}

impl StoragePattern {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "hierarchical" => Some(Self::Hierarchical),
            "flat" => Some(Self::Flat),
            "mixed" => Some(Self::Mixed),
            "emergent" => Some(Self::Emergent),
            _ => None,
        }
    }

    /// Pattern declared by a structure config; absent or unknown names mean hierarchical.
    pub fn from_structure(structure: &StructureConfig) -> Self {
        match structure.storage_pattern.as_deref() {
            None => Self::Hierarchical,
            Some(name) => Self::parse(name).unwrap_or_else(|| {
                debug!(pattern = name, "Unknown storage pattern, using hierarchical");
                Self::Hierarchical
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Flat => "flat",
            Self::Mixed => "mixed",
            Self::Emergent => "emergent",
        }
    }
}

impl fmt::Display for StoragePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path template used when a template declares none.
pub fn default_path_template(context_type: &str) -> String {
    match context_type {
        "workspace" => "{name}".to_string(),
        "project" => "projects/{name}".to_string(),
        "task" => "tasks/{name}".to_string(),
        "folder" => "folders/{name}".to_string(),
        "emergent" => "emergent/{name}".to_string(),
        other => format!("{}s/{{name}}", other),
    }
}

/// Computes document paths under a workspace root.
#[derive(Debug, Clone)]
pub struct StoragePathResolver {
    workspace_root: PathBuf,
}

impl StoragePathResolver {
    pub fn new<P: AsRef<Path>>(workspace_root: P) -> Self {
        Self {
            workspace_root: workspace_root.as_ref().to_path_buf(),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Compute the document path for a new context.
    ///
    /// `parent_path` is the parent's `storagePath` (its `context.yaml`), if any.
    pub fn resolve(
        &self,
        context_type: &str,
        config: &ContextConfig,
        parent_path: Option<&Path>,
        structure: &StructureConfig,
    ) -> Result<PathBuf, StorageError> {
        let pattern = StoragePattern::from_structure(structure);
        let path_template = structure
            .path_template
            .clone()
            .unwrap_or_else(|| default_path_template(context_type));
        let relative = substitute(&path_template, context_type, config)?;

        let base = match pattern {
            StoragePattern::Flat => self.workspace_root.clone(),
            StoragePattern::Hierarchical | StoragePattern::Mixed | StoragePattern::Emergent => {
                self.hierarchical_base(parent_path)
            }
        };

        let path = base.join(relative).join(CONTEXT_FILE_NAME);
        debug!(
            context_type,
            pattern = %pattern,
            path = %path.display(),
            "Resolved storage path"
        );
        Ok(path)
    }

    /// Directory a hierarchical path nests under: the parent's directory, else the root.
    fn hierarchical_base(&self, parent_path: Option<&Path>) -> PathBuf {
        parent_path
            .filter(|p| !p.as_os_str().is_empty())
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.workspace_root.clone())
    }
}

/// Fill `{name}`, `{type}` and `{id}` and check the result stays relative.
fn substitute(
    path_template: &str,
    context_type: &str,
    config: &ContextConfig,
) -> Result<PathBuf, StorageError> {
    let name = config
        .name
        .clone()
        .unwrap_or_else(|| fallback_label(context_type));
    let id = config
        .id
        .clone()
        .unwrap_or_else(|| fallback_label(context_type));

    let resolved = path_template
        .replace("{name}", &name)
        .replace("{type}", context_type)
        .replace("{id}", &id);
    let relative = PathBuf::from(&resolved);

    if resolved.trim().is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "path template '{}' resolved to an empty path",
            path_template
        )));
    }
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath(format!(
                    "'{}' must stay inside the storage tree",
                    resolved
                )));
            }
        }
    }
    Ok(relative)
}
