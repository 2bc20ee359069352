//! Context documents.
//!
//! A [`Context`] is persisted as YAML with camelCase keys; field names map 1:1 to the
//! struct. Caller-supplied fields the model does not know about are kept in `extra`
//! and written back unchanged.

use crate::template::StructureConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `type` recorded on the inheritance chain entry of a template
pub const TEMPLATE_CHAIN_KIND: &str = "template";

/// Weak reference to a parent context: resolved by lookup, never held live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(rename = "type")]
    pub context_type: String,
    pub id: String,
    pub path: PathBuf,
}

/// Provenance record for one link of the inheritance chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Context type of an ancestor, or `"template"`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

impl ChainEntry {
    pub fn is_template(&self) -> bool {
        self.kind == TEMPLATE_CHAIN_KIND
    }
}

/// One outgoing edge stored on the source context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub target: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// `{id, type}` pair used in operation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRef {
    pub id: String,
    #[serde(rename = "type")]
    pub context_type: String,
}

/// Caller-supplied configuration for a new context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// Everything else; overrides inherited fields of the same name
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContextConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// A persisted, typed context document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(rename = "type")]
    pub context_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub storage_path: PathBuf,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub template_version: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub behavior_rules: Vec<String>,
    #[serde(default)]
    pub memory_config: Map<String, Value>,
    #[serde(default)]
    pub structure_config: StructureConfig,
    #[serde(default)]
    pub parent_context: Option<ParentRef>,
    #[serde(default)]
    pub inheritance_chain: Vec<ChainEntry>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Vec<RelationshipEntry>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Context {
    /// Weak reference for children created under this context.
    pub fn as_parent_ref(&self) -> ParentRef {
        ParentRef {
            context_type: self.context_type.clone(),
            id: self.id.clone(),
            path: self.storage_path.clone(),
        }
    }

    pub fn to_ref(&self) -> ContextRef {
        ContextRef {
            id: self.id.clone(),
            context_type: self.context_type.clone(),
        }
    }

    /// Directory holding this context's document.
    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_path.parent()
    }

    /// Outgoing edges of `relationship`, in insertion order.
    pub fn relationship_entries(&self, relationship: &str) -> &[RelationshipEntry] {
        self.relationships
            .get(relationship)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_relationship(&self, relationship: &str, target: &str) -> bool {
        self.relationship_entries(relationship)
            .iter()
            .any(|e| e.target == target)
    }

    /// Add the `(relationship, target)` edge, or replace its properties in place.
    ///
    /// Returns `true` when a new edge was appended.
    pub fn upsert_relationship(
        &mut self,
        relationship: &str,
        target: &str,
        properties: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> bool {
        let entries = self.relationships.entry(relationship.to_string()).or_default();
        let appended = match entries.iter_mut().find(|e| e.target == target) {
            Some(existing) => {
                existing.properties = properties;
                existing.updated = Some(now);
                false
            }
            None => {
                entries.push(RelationshipEntry {
                    target: target.to_string(),
                    properties,
                    created: Some(now),
                    updated: None,
                });
                true
            }
        };
        self.updated = now;
        appended
    }

    /// Remove the `(relationship, target)` edge, dropping the type key once empty.
    ///
    /// Returns `true` if an edge was removed; `updated` is only touched in that case.
    pub fn remove_relationship(
        &mut self,
        relationship: &str,
        target: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(entries) = self.relationships.get_mut(relationship) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.target != target);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.relationships.remove(relationship);
        }
        if removed {
            self.updated = now;
        }
        removed
    }
}
