//! Typed view of a template document.
//!
//! A template document carries a `metadata` block plus one `<type>_config` block per
//! context type it configures. The blocks are collected into a map keyed by the bare
//! type name, so lookups never build field names at runtime.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

const TYPE_CONFIG_SUFFIX: &str = "_config";
const DEFAULT_TEMPLATE_VERSION: &str = "1.0.0";

/// `metadata` block of a template document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
}

/// Storage layout settings (`structure_config`)
///
/// Persisted verbatim into every instance created from the template, so unknown
/// keys are carried along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declaration of one relationship type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTypeConfig {
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub inverse: Option<String>,
    #[serde(default)]
    pub target_types: Vec<String>,
}

impl RelationshipTypeConfig {
    /// Inverse relationship name, if edges of this type must be mirrored.
    pub fn mirror(&self) -> Option<&str> {
        if self.bidirectional {
            self.inverse.as_deref().filter(|inverse| !inverse.is_empty())
        } else {
            None
        }
    }

    /// Whether a target of `target_type` is acceptable.
    pub fn accepts_target(&self, target_type: &str) -> bool {
        self.target_types.is_empty()
            || self
                .target_types
                .iter()
                .any(|t| t == "*" || t == target_type)
    }
}

/// One `<type>_config` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    #[serde(default)]
    pub structure_config: StructureConfig,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub behavior_rules: Vec<String>,
    #[serde(default)]
    pub memory_config: Map<String, Value>,
    #[serde(default)]
    pub allowed_children: Vec<String>,
    #[serde(default)]
    pub relationship_types: BTreeMap<String, RelationshipTypeConfig>,
    /// Relationship types every context type may use (declared by the `base` template)
    #[serde(default)]
    pub universal_relationships: BTreeMap<String, RelationshipTypeConfig>,
}

/// Parsed template document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub metadata: TemplateMetadata,
    /// Type configs keyed by type name (`project_config` is stored under `project`)
    pub configs: HashMap<String, TypeConfig>,
}

impl Template {
    /// Build a template from a parsed document.
    pub fn from_document(document: Value) -> Result<Self, String> {
        let fields = match document {
            Value::Object(fields) => fields,
            Value::Null => return Err("template document is empty".to_string()),
            other => {
                return Err(format!(
                    "template document must be a mapping, found {}",
                    value_kind(&other)
                ))
            }
        };

        let mut template = Template::default();
        for (key, value) in fields {
            if key == "metadata" {
                template.metadata = serde_json::from_value(value)
                    .map_err(|e| format!("invalid metadata block: {}", e))?;
            } else if let Some(context_type) = key.strip_suffix(TYPE_CONFIG_SUFFIX) {
                let config = if value.is_null() {
                    TypeConfig::default()
                } else {
                    serde_json::from_value(value)
                        .map_err(|e| format!("invalid '{}' block: {}", key, e))?
                };
                template.configs.insert(context_type.to_string(), config);
            }
        }
        Ok(template)
    }

    /// Template identifier recorded on instances (`<type>-template` when undeclared).
    pub fn id_for(&self, context_type: &str) -> String {
        self.metadata
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-template", context_type))
    }

    /// Template version recorded on instances.
    pub fn version(&self) -> String {
        self.metadata
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_TEMPLATE_VERSION.to_string())
    }

    /// Config block for `context_type`; an absent block reads as all defaults.
    pub fn config_for(&self, context_type: &str) -> TypeConfig {
        self.configs.get(context_type).cloned().unwrap_or_default()
    }

    pub fn allowed_children(&self, context_type: &str) -> &[String] {
        self.configs
            .get(context_type)
            .map(|c| c.allowed_children.as_slice())
            .unwrap_or(&[])
    }

    pub fn relationship_type(
        &self,
        context_type: &str,
        relationship: &str,
    ) -> Option<&RelationshipTypeConfig> {
        self.configs
            .get(context_type)
            .and_then(|c| c.relationship_types.get(relationship))
    }

    pub fn universal_relationship(
        &self,
        context_type: &str,
        relationship: &str,
    ) -> Option<&RelationshipTypeConfig> {
        self.configs
            .get(context_type)
            .and_then(|c| c.universal_relationships.get(relationship))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Accept `version: 1.0` as well as `version: "1.0"`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
