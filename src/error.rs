//! Error types for the Stratum context store.

use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to serialize context document {path:?}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by the context operations in [`crate::api::ContextApi`]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to load context template for type '{context_type}': {reason}")]
    TemplateNotFound {
        context_type: String,
        reason: String,
    },

    #[error("Context '{0}' not found")]
    ContextNotFound(String),

    #[error(
        "Cannot create '{child_type}' inside '{parent_type}'. Allowed children: {}. {suggestion} \
         Use force to override this safety check.",
        allowed_children.join(", ")
    )]
    ContainmentViolation {
        child_type: String,
        parent_type: String,
        allowed_children: Vec<String>,
        suggestion: String,
    },

    #[error("Relationship type '{relationship}' is not defined for context type '{context_type}'")]
    RelationshipTypeUndefined {
        relationship: String,
        context_type: String,
    },

    #[error(
        "Relationship '{relationship}' from '{source_type}' to '{target_type}' is not allowed. \
         Allowed targets: {}",
        allowed_targets.join(", ")
    )]
    RelationshipTargetTypeInvalid {
        relationship: String,
        source_type: String,
        target_type: String,
        allowed_targets: Vec<String>,
    },

    #[error("Cyclic inheritance detected: context '{0}' appears twice in its own parent chain")]
    CyclicInheritance(String),

    #[error("Invalid value for context field '{field}': {reason}")]
    InvalidContextField { field: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
