//! Inheritance chain resolution and merging.
//!
//! A new context inherits from its ancestors (parent, grandparent, ... up to the
//! root) and from its own type's template. The chain is ordered root-first with the
//! template last, and merged in that order:
//!
//! - ancestors append their `capabilities` and shallow-merge their `memory_config`
//! - the template appends its `capabilities`, sets `behavior_rules` and
//!   `structure_config`, and shallow-merges its `memory_config`
//!
//! Caller-supplied fields are applied on top by [`apply_overrides`].

use crate::context::{ChainEntry, Context, ContextConfig, TEMPLATE_CHAIN_KIND};
use crate::error::ApiError;
use crate::storage::ContextStore;
use crate::template::{StructureConfig, Template};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One link of an inheritance chain
#[derive(Debug, Clone)]
pub enum ChainLink {
    Ancestor(Context),
    Template { id: String, template: Template },
}

impl ChainLink {
    /// Provenance record stored on the new context.
    pub fn to_entry(&self) -> ChainEntry {
        match self {
            ChainLink::Ancestor(context) => ChainEntry {
                kind: context.context_type.clone(),
                id: Some(context.id.clone()),
                template: Some(context.template.clone()),
            },
            ChainLink::Template { id, .. } => ChainEntry {
                kind: TEMPLATE_CHAIN_KIND.to_string(),
                id: Some(id.clone()),
                template: Some(id.clone()),
            },
        }
    }
}

/// Root-first ancestors followed by the type's own template
#[derive(Debug, Clone)]
pub struct InheritanceChain {
    links: Vec<ChainLink>,
}

impl InheritanceChain {
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn entries(&self) -> Vec<ChainEntry> {
        self.links.iter().map(ChainLink::to_entry).collect()
    }

    /// Merge the chain for a context of `context_type`.
    pub fn merge(&self, context_type: &str) -> MergedConfig {
        let mut merged = MergedConfig::default();
        for link in &self.links {
            match link {
                ChainLink::Ancestor(context) => {
                    merged.capabilities.extend(context.capabilities.iter().cloned());
                    shallow_merge(&mut merged.memory_config, &context.memory_config);
                }
                ChainLink::Template { template, .. } => {
                    let config = template.config_for(context_type);
                    merged.capabilities.extend(config.capabilities);
                    merged.behavior_rules = config.behavior_rules;
                    merged.structure_config = config.structure_config;
                    shallow_merge(&mut merged.memory_config, &config.memory_config);
                }
            }
        }
        merged
    }
}

/// Inherited configuration of a new context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    pub capabilities: Vec<String>,
    pub behavior_rules: Vec<String>,
    pub memory_config: Map<String, Value>,
    pub structure_config: StructureConfig,
}

fn shallow_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// Build the chain for a context created under `parent` from `template`.
///
/// Each ancestor is re-read from the store by `(type, id)`. A reference that no
/// longer resolves ends the walk; an id seen twice is a cycle.
pub fn build_inheritance_chain(
    store: &ContextStore,
    parent: Option<&Context>,
    template_id: String,
    template: Template,
) -> Result<InheritanceChain, ApiError> {
    let mut ancestors = Vec::new();
    let mut visited = HashSet::new();

    let mut current = parent.cloned();
    while let Some(context) = current.take() {
        if !visited.insert(context.id.clone()) {
            return Err(ApiError::CyclicInheritance(context.id));
        }
        if let Some(parent_ref) = &context.parent_context {
            if visited.contains(&parent_ref.id) {
                return Err(ApiError::CyclicInheritance(parent_ref.id.clone()));
            }
            current = store.load_context(&parent_ref.context_type, &parent_ref.id);
            if current.is_none() {
                warn!(
                    context_id = %context.id,
                    parent_type = %parent_ref.context_type,
                    parent_id = %parent_ref.id,
                    "Parent reference does not resolve; inheritance stops here"
                );
            }
        }
        ancestors.push(ChainLink::Ancestor(context));
    }

    ancestors.reverse();
    ancestors.push(ChainLink::Template {
        id: template_id,
        template,
    });
    debug!(links = ancestors.len(), "Built inheritance chain");
    Ok(InheritanceChain { links: ancestors })
}

/// Document keys the create pipeline always computes itself
const PIPELINE_FIELDS: &[&str] = &[
    "type",
    "id",
    "storagePath",
    "template",
    "templateVersion",
    "parentContext",
    "inheritanceChain",
    "relationships",
    "created",
    "updated",
];

/// Apply caller-supplied fields on top of the inherited configuration.
///
/// `capabilities`, `behaviorRules`, `memoryConfig` and `structureConfig` replace the
/// inherited value; pipeline-owned fields are ignored; everything else is returned
/// as extra document fields. `name` belongs on [`ContextConfig::name`] and is
/// rejected here, since it would collide with the document's own `name` key.
pub fn apply_overrides(
    merged: &mut MergedConfig,
    config: &ContextConfig,
) -> Result<Map<String, Value>, ApiError> {
    let mut extra = Map::new();
    for (key, value) in &config.fields {
        match key.as_str() {
            "capabilities" => merged.capabilities = typed_field(key, value)?,
            "behaviorRules" => merged.behavior_rules = typed_field(key, value)?,
            "memoryConfig" => merged.memory_config = typed_field(key, value)?,
            "structureConfig" => merged.structure_config = typed_field(key, value)?,
            "name" => {
                return Err(ApiError::InvalidContextField {
                    field: key.clone(),
                    reason: "set the name through ContextConfig::name".to_string(),
                });
            }
            k if PIPELINE_FIELDS.contains(&k) => {
                debug!(field = k, "Ignoring caller value for computed field");
            }
            _ => {
                extra.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(extra)
}

fn typed_field<T: DeserializeOwned>(field: &str, value: &Value) -> Result<T, ApiError> {
    serde_json::from_value(value.clone()).map_err(|e| ApiError::InvalidContextField {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
