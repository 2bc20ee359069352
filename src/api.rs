//! Context API
//!
//! The single operations surface of the store: context creation, persistence and
//! lookup, and the relationship graph. Stateless apart from the per-context write
//! locks; every call re-reads what it needs from disk.

use crate::concurrency::ContextLockManager;
use crate::config::StratumConfig;
use crate::containment::{validate_containment, CreateOptions};
use crate::context::{generate_context_id, Context, ContextConfig};
use crate::error::ApiError;
use crate::inheritance::{apply_overrides, build_inheritance_chain};
use crate::relationship::{
    mirror_relationship, traverse, validate_relationship, AddOptions, Direction, IncomingEdge,
    RelationshipGraph, RelationshipResult, RelationshipView, RemovalResult, INVERSE_OF_PROPERTY,
};
use crate::storage::{ContextStore, ScanConfig, StoragePathResolver};
use crate::template::{FsTemplateSource, TemplateSource};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Traversal depth used when none is configured
pub const DEFAULT_GRAPH_DEPTH: usize = 2;

/// Context API service
pub struct ContextApi {
    /// Template lookup
    templates: Arc<dyn TemplateSource>,
    /// File-backed context documents
    store: Arc<ContextStore>,
    /// Serializes load-modify-save cycles per context id
    lock_manager: Arc<ContextLockManager>,
    default_depth: usize,
}

impl ContextApi {
    /// Create a new Context API service
    pub fn new(
        templates: Arc<dyn TemplateSource>,
        store: Arc<ContextStore>,
        lock_manager: Arc<ContextLockManager>,
    ) -> Self {
        Self {
            templates,
            store,
            lock_manager,
            default_depth: DEFAULT_GRAPH_DEPTH,
        }
    }

    /// Build the API from loaded configuration.
    ///
    /// Relative roots are resolved against `project_root`; the workspace root is
    /// created if missing.
    pub fn from_config(project_root: &Path, config: &StratumConfig) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        let (template_root, workspace_root) = config.resolve_roots(project_root);
        let store = ContextStore::with_config(
            &workspace_root,
            ScanConfig {
                ignore_dirs: config.store.ignore_dirs.clone(),
                ..ScanConfig::default()
            },
        )?;
        debug!(
            template_root = %template_root.display(),
            workspace_root = %store.workspace_root().display(),
            "Context API configured"
        );

        Ok(Self::new(
            Arc::new(FsTemplateSource::new(template_root)),
            Arc::new(store),
            Arc::new(ContextLockManager::new()),
        )
        .with_default_depth(config.traversal.default_depth))
    }

    /// Set the traversal depth used when a query passes `None`.
    pub fn with_default_depth(mut self, depth: usize) -> Self {
        self.default_depth = depth;
        self
    }

    /// Traversal depth used when a query passes `None`.
    pub fn default_depth(&self) -> usize {
        self.default_depth
    }

    /// Backing context store.
    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Template source used for creation and relationship validation.
    pub fn templates(&self) -> &Arc<dyn TemplateSource> {
        &self.templates
    }

    /// Run `f` holding the write lock for `context_id`, then drop locks nobody holds.
    fn with_context_lock<T>(
        &self,
        context_id: &str,
        f: impl FnOnce() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let result = {
            let lock = self.lock_manager.get_lock(context_id);
            let _guard = lock.lock();
            f()
        };
        self.lock_manager.prune();
        result
    }

    /// Create and persist a new context
    ///
    /// # Arguments
    /// * `context_type` - Type of the new context; its template must exist
    /// * `config` - Caller fields: `name`, optional `id`, overrides and extra fields
    /// * `parent` - Context to create the new one under, if any
    /// * `options` - `force` or emergent mode skip the containment check
    ///
    /// # Behavior
    /// * Template load, containment check, inheritance merge, path resolution, save
    /// * Nothing is written unless every step succeeds
    pub fn create_context(
        &self,
        context_type: &str,
        config: ContextConfig,
        parent: Option<&Context>,
        options: CreateOptions,
    ) -> Result<Context, ApiError> {
        let template = self.templates.load(context_type)?;
        validate_containment(self.templates.as_ref(), context_type, parent, options)?;

        let template_id = template.id_for(context_type);
        let template_version = template.version();
        let structure = template.config_for(context_type).structure_config;

        let chain = build_inheritance_chain(&self.store, parent, template_id.clone(), template)?;
        let mut merged = chain.merge(context_type);
        let extra = apply_overrides(&mut merged, &config)?;

        let storage_path = StoragePathResolver::new(self.store.workspace_root()).resolve(
            context_type,
            &config,
            parent.map(|p| p.storage_path.as_path()),
            &structure,
        )?;

        let now = Utc::now();
        let context = Context {
            context_type: context_type.to_string(),
            id: config
                .id
                .clone()
                .unwrap_or_else(|| generate_context_id(context_type)),
            name: config.name.clone(),
            storage_path,
            template: template_id,
            template_version,
            capabilities: merged.capabilities,
            behavior_rules: merged.behavior_rules,
            memory_config: merged.memory_config,
            structure_config: merged.structure_config,
            parent_context: parent.map(Context::as_parent_ref),
            inheritance_chain: chain.entries(),
            relationships: BTreeMap::new(),
            created: now,
            updated: now,
            extra,
        };

        self.with_context_lock(&context.id, || Ok(self.store.save_context(&context)?))?;

        info!(
            context_type,
            id = %context.id,
            path = %context.storage_path.display(),
            "Created context"
        );
        Ok(context)
    }

    /// Persist a context at its `storage_path`.
    pub fn save_context(&self, context: &Context) -> Result<(), ApiError> {
        self.with_context_lock(&context.id, || Ok(self.store.save_context(context)?))
    }

    /// Find a context by type and id (full scan).
    pub fn load_context(&self, context_type: &str, id: &str) -> Result<Option<Context>, ApiError> {
        Ok(self.store.load_context(context_type, id))
    }

    /// Find a context by id alone (full scan).
    pub fn load_context_by_id(&self, id: &str) -> Result<Option<Context>, ApiError> {
        Ok(self.store.load_context_by_id(id))
    }

    /// All contexts of a type, in path order.
    pub fn list_contexts(&self, context_type: &str) -> Result<Vec<Context>, ApiError> {
        Ok(self.store.list_contexts(context_type))
    }

    pub fn find_context_by_name(
        &self,
        context_type: &str,
        name: &str,
    ) -> Result<Option<Context>, ApiError> {
        Ok(self.store.find_context_by_name(context_type, name))
    }

    /// Add (or update) a typed edge from `source_id` to `target_id`
    ///
    /// # Arguments
    /// * `relationship` - Relationship type name
    /// * `properties` - Edge properties; replace the old ones when the edge exists
    /// * `options` - `force` skips relationship and target type validation
    ///
    /// # Behavior
    /// * Both contexts must exist
    /// * If the type is declared bidirectional with an inverse, the inverse edge is
    ///   written on the target (unvalidated, tagged `inverse_of`, never mirrored again)
    pub fn add_relationship(
        &self,
        source_id: &str,
        relationship: &str,
        target_id: &str,
        properties: Map<String, Value>,
        options: AddOptions,
    ) -> Result<RelationshipResult, ApiError> {
        let target = self
            .store
            .load_context_by_id(target_id)
            .ok_or_else(|| ApiError::ContextNotFound(target_id.to_string()))?;

        let source = self.with_context_lock(source_id, || {
            let mut source = self
                .store
                .load_context_by_id(source_id)
                .ok_or_else(|| ApiError::ContextNotFound(source_id.to_string()))?;
            if !options.force {
                validate_relationship(self.templates.as_ref(), &source, relationship, &target)?;
            }

            let appended =
                source.upsert_relationship(relationship, target_id, properties.clone(), Utc::now());
            self.store.save_context(&source)?;
            info!(
                source = source_id,
                relationship,
                target = target_id,
                appended,
                "Stored relationship"
            );
            Ok(source)
        })?;

        if let Some(inverse) =
            mirror_relationship(self.templates.as_ref(), &source.context_type, relationship)
        {
            let mut inverse_properties = properties.clone();
            inverse_properties.insert(
                INVERSE_OF_PROPERTY.to_string(),
                Value::String(relationship.to_string()),
            );
            self.mirror_add(target_id, &inverse, source_id, inverse_properties)?;
        }

        Ok(RelationshipResult {
            source: source.to_ref(),
            target: target.to_ref(),
            relationship: relationship.to_string(),
            properties,
        })
    }

    fn mirror_add(
        &self,
        context_id: &str,
        relationship: &str,
        target_id: &str,
        properties: Map<String, Value>,
    ) -> Result<(), ApiError> {
        self.with_context_lock(context_id, || {
            let mut context = self
                .store
                .load_context_by_id(context_id)
                .ok_or_else(|| ApiError::ContextNotFound(context_id.to_string()))?;
            context.upsert_relationship(relationship, target_id, properties, Utc::now());
            self.store.save_context(&context)?;
            debug!(
                source = context_id,
                relationship,
                target = target_id,
                "Stored inverse relationship"
            );
            Ok(())
        })
    }

    /// Remove the `relationship` edge from `source_id` to `target_id`
    ///
    /// # Behavior
    /// * Unchanged documents are not rewritten, so removal is idempotent
    /// * Bidirectional types also remove the inverse edge from the target, if the
    ///   target still exists
    pub fn remove_relationship(
        &self,
        source_id: &str,
        relationship: &str,
        target_id: &str,
    ) -> Result<RemovalResult, ApiError> {
        let (source_type, removed) = self.with_context_lock(source_id, || {
            let mut source = self
                .store
                .load_context_by_id(source_id)
                .ok_or_else(|| ApiError::ContextNotFound(source_id.to_string()))?;
            let removed = source.remove_relationship(relationship, target_id, Utc::now());
            if removed {
                self.store.save_context(&source)?;
                info!(
                    source = source_id,
                    relationship,
                    target = target_id,
                    "Removed relationship"
                );
            }
            Ok((source.context_type, removed))
        })?;

        if let Some(inverse) =
            mirror_relationship(self.templates.as_ref(), &source_type, relationship)
        {
            self.mirror_remove(target_id, &inverse, source_id)?;
        }

        Ok(RemovalResult {
            source: source_id.to_string(),
            target: target_id.to_string(),
            relationship: relationship.to_string(),
            removed,
        })
    }

    fn mirror_remove(
        &self,
        context_id: &str,
        relationship: &str,
        target_id: &str,
    ) -> Result<(), ApiError> {
        self.with_context_lock(context_id, || {
            let Some(mut context) = self.store.load_context_by_id(context_id) else {
                warn!(
                    context_id,
                    relationship, "Inverse edge owner no longer exists; skipping mirrored removal"
                );
                return Ok(());
            };
            if context.remove_relationship(relationship, target_id, Utc::now()) {
                self.store.save_context(&context)?;
                debug!(
                    source = context_id,
                    relationship,
                    target = target_id,
                    "Removed inverse relationship"
                );
            }
            Ok(())
        })
    }

    /// Edges of a context, optionally filtered by relationship type
    ///
    /// Outgoing edges come from the context's own document; incoming edges are found
    /// by scanning every other context in the workspace.
    pub fn get_relationships(
        &self,
        context_id: &str,
        relationship: Option<&str>,
        direction: Direction,
    ) -> Result<RelationshipView, ApiError> {
        let context = self
            .store
            .load_context_by_id(context_id)
            .ok_or_else(|| ApiError::ContextNotFound(context_id.to_string()))?;
        let wanted = |name: &str| relationship.map_or(true, |r| r == name);

        let mut view = RelationshipView {
            context_id: context_id.to_string(),
            ..RelationshipView::default()
        };

        if direction.includes_outgoing() {
            view.outgoing = context
                .relationships
                .into_iter()
                .filter(|(name, _)| wanted(name.as_str()))
                .collect();
        }

        if direction.includes_incoming() {
            for other in self.store.documents() {
                if other.id == context_id {
                    continue;
                }
                for (name, entries) in &other.relationships {
                    if !wanted(name.as_str()) {
                        continue;
                    }
                    for entry in entries.iter().filter(|e| e.target == context_id) {
                        view.incoming
                            .entry(name.clone())
                            .or_default()
                            .push(IncomingEdge {
                                source: other.id.clone(),
                                source_type: other.context_type.clone(),
                                properties: entry.properties.clone(),
                                created: entry.created,
                            });
                    }
                }
            }
        }

        Ok(view)
    }

    /// Bounded-depth traversal from `start_ids`
    ///
    /// # Arguments
    /// * `relationship_types` - Types to follow; empty follows all
    /// * `depth` - Maximum hops from a start node; `None` uses the configured default
    ///
    /// # Behavior
    /// * Reads one snapshot of the store for the whole query
    /// * A node is expanded at most once per query, whichever start reaches it first
    pub fn query_relationship_graph(
        &self,
        start_ids: &[String],
        relationship_types: &[String],
        depth: Option<usize>,
    ) -> Result<RelationshipGraph, ApiError> {
        let depth = depth.unwrap_or(self.default_depth);
        let snapshot = self.store.scan_all();
        let graph = traverse(&snapshot, start_ids, relationship_types, depth);
        debug!(
            starts = start_ids.len(),
            depth,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Traversed relationship graph"
        );
        Ok(graph)
    }
}
