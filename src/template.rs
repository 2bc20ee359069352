//! Context templates: per-type schema documents that drive path layout,
//! containment rules, inherited configuration, and relationship types.

pub mod loader;
pub mod model;

pub use loader::{FsTemplateSource, TemplateSource};
pub use model::{RelationshipTypeConfig, StructureConfig, Template, TemplateMetadata, TypeConfig};
