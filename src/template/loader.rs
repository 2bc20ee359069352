//! Template loading.
//!
//! Templates live at `<template_root>/types/<type>/context.yaml`. Loading is behind
//! [`TemplateSource`] so the API does not care where templates come from.

use super::model::Template;
use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// File name of both template and instance documents
pub const CONTEXT_FILE_NAME: &str = "context.yaml";

/// Port for template lookup
pub trait TemplateSource: Send + Sync {
    /// Load and parse the template for `context_type`.
    ///
    /// Fails with [`ApiError::TemplateNotFound`] when the template is absent or unparsable.
    fn load(&self, context_type: &str) -> Result<Template, ApiError>;
}

/// Filesystem template source rooted at a template directory
pub struct FsTemplateSource {
    root: PathBuf,
}

impl FsTemplateSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the template document for `context_type`.
    pub fn template_path(&self, context_type: &str) -> PathBuf {
        self.root
            .join("types")
            .join(context_type)
            .join(CONTEXT_FILE_NAME)
    }
}

fn validate_type_name(context_type: &str) -> Result<(), String> {
    if context_type.is_empty() {
        return Err("context type is empty".to_string());
    }
    if context_type.contains(['/', '\\']) || context_type == "." || context_type == ".." {
        return Err(format!("'{}' is not a valid context type name", context_type));
    }
    Ok(())
}

impl TemplateSource for FsTemplateSource {
    fn load(&self, context_type: &str) -> Result<Template, ApiError> {
        let not_found = |reason: String| ApiError::TemplateNotFound {
            context_type: context_type.to_string(),
            reason,
        };

        validate_type_name(context_type).map_err(not_found)?;

        let path = self.template_path(context_type);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| not_found(format!("{}: {}", path.display(), e)))?;
        let document: serde_json::Value = serde_yaml_bw::from_str(&content)
            .map_err(|e| not_found(format!("{}: {}", path.display(), e)))?;
        let template = Template::from_document(document)
            .map_err(|e| not_found(format!("{}: {}", path.display(), e)))?;

        tracing::trace!(context_type, path = %path.display(), "Loaded context template");
        Ok(template)
    }
}
