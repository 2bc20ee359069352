//! Stratum: Hierarchical Context Store
//!
//! A file-backed store of typed, template-driven context documents with cascading
//! inheritance, pluggable storage layouts, containment rules and a typed
//! relationship graph.

pub mod api;
pub mod concurrency;
pub mod config;
pub mod containment;
pub mod context;
pub mod error;
pub mod inheritance;
pub mod logging;
pub mod relationship;
pub mod storage;
pub mod template;

pub use api::ContextApi;
pub use error::{ApiError, StorageError};
