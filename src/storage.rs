//! Storage domain: on-disk layout of context documents and the file-backed store.

pub mod path;
pub mod store;

pub use path::{default_path_template, StoragePathResolver, StoragePattern};
pub use store::{ContextStore, ScanConfig};
