//! Context domain: the persisted document model and identifier generation.

pub mod id;
pub mod model;

pub use id::{fallback_label, generate_context_id};
pub use model::{
    ChainEntry, Context, ContextConfig, ContextRef, ParentRef, RelationshipEntry,
    TEMPLATE_CHAIN_KIND,
};
