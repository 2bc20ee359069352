//! Typed relationships between contexts.
//!
//! A relationship type is declared in the source type's template
//! (`relationship_types`) or, for every type at once, in the `base` template's
//! `universal_relationships`. Declarations control which target types are accepted
//! and whether edges are mirrored onto the target under an inverse name.

pub mod model;
pub mod traversal;

pub use model::{
    AddOptions, Direction, GraphEdge, GraphNode, IncomingEdge, RelationshipGraph,
    RelationshipResult, RelationshipView, RemovalResult,
};
pub use traversal::traverse;

use crate::context::Context;
use crate::error::ApiError;
use crate::template::{RelationshipTypeConfig, TemplateSource};
use tracing::debug;

/// Template declaring relationships available to every context type
pub const BASE_TEMPLATE_TYPE: &str = "base";

/// Property added to mirrored edges, naming the forward relationship
pub const INVERSE_OF_PROPERTY: &str = "inverse_of";

/// Look up the declaration of `relationship` for `context_type`.
///
/// The type's own template is consulted first, then the base template's universal
/// relationships. A missing or unparsable base template declares nothing.
pub fn lookup_relationship_config(
    templates: &dyn TemplateSource,
    context_type: &str,
    relationship: &str,
) -> Result<Option<RelationshipTypeConfig>, ApiError> {
    let template = templates.load(context_type)?;
    if let Some(config) = template.relationship_type(context_type, relationship) {
        return Ok(Some(config.clone()));
    }

    match templates.load(BASE_TEMPLATE_TYPE) {
        Ok(base) => Ok(base
            .universal_relationship(BASE_TEMPLATE_TYPE, relationship)
            .cloned()),
        Err(e) => {
            debug!(error = %e, "No base template; no universal relationships");
            Ok(None)
        }
    }
}

/// Check that `source` may hold a `relationship` edge to `target`.
pub fn validate_relationship(
    templates: &dyn TemplateSource,
    source: &Context,
    relationship: &str,
    target: &Context,
) -> Result<RelationshipTypeConfig, ApiError> {
    let config = lookup_relationship_config(templates, &source.context_type, relationship)?
        .ok_or_else(|| ApiError::RelationshipTypeUndefined {
            relationship: relationship.to_string(),
            context_type: source.context_type.clone(),
        })?;

    if !config.accepts_target(&target.context_type) {
        return Err(ApiError::RelationshipTargetTypeInvalid {
            relationship: relationship.to_string(),
            source_type: source.context_type.clone(),
            target_type: target.context_type.clone(),
            allowed_targets: config.target_types.clone(),
        });
    }
    Ok(config)
}

/// Inverse relationship to mirror `relationship` edges of `context_type` under.
///
/// Best-effort: any lookup failure means no mirroring.
pub fn mirror_relationship(
    templates: &dyn TemplateSource,
    context_type: &str,
    relationship: &str,
) -> Option<String> {
    match lookup_relationship_config(templates, context_type, relationship) {
        Ok(config) => config.and_then(|c| c.mirror().map(str::to_string)),
        Err(e) => {
            debug!(context_type, relationship, error = %e, "Relationship config unavailable");
            None
        }
    }
}
