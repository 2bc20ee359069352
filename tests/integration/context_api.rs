//! Integration tests for context creation and lookup through `ContextApi`
//!
//! Tests cover:
//! - Path layout per storage pattern
//! - Inheritance merge and provenance
//! - Caller overrides and extra fields
//! - Round-trip through the store

use super::test_utils::create_test_api;
use serde_json::json;
use stratum::containment::CreateOptions;
use stratum::context::ContextConfig;
use stratum::error::ApiError;

#[test]
fn test_root_level_workspace() {
    let (api, _temp_dir) = create_test_api();
    let root = api.store().workspace_root().to_path_buf();

    let acme = api
        .create_context("workspace", ContextConfig::named("acme"), None, CreateOptions::default())
        .unwrap();

    assert_eq!(acme.storage_path, root.join("acme").join("context.yaml"));
    assert!(acme.storage_path.exists());
    assert!(acme.id.starts_with("workspace-"));
    assert_eq!(acme.template, "workspace-template");
    assert_eq!(acme.template_version, "1.0.0");
    assert_eq!(acme.capabilities, vec!["organize"]);
    assert_eq!(acme.behavior_rules, vec!["keep-tidy"]);
    assert!(acme.parent_context.is_none());
    assert_eq!(acme.inheritance_chain.len(), 1);
    assert!(acme.inheritance_chain[0].is_template());
}

#[test]
fn test_child_inherits_from_parent_and_template() {
    let (api, _temp_dir) = create_test_api();
    let acme = api
        .create_context("workspace", ContextConfig::named("acme"), None, CreateOptions::default())
        .unwrap();
    let website = api
        .create_context(
            "project",
            ContextConfig::named("website"),
            Some(&acme),
            CreateOptions::default(),
        )
        .unwrap();

    assert_eq!(
        website.storage_path,
        acme.storage_dir().unwrap().join("projects/website/context.yaml")
    );
    assert_eq!(website.capabilities, vec!["organize", "plan"]);
    assert_eq!(website.behavior_rules, vec!["ship-it"]);
    assert_eq!(website.memory_config["scope"], json!("project"));
    assert_eq!(website.memory_config["retention"], json!("long"));
    assert_eq!(website.template_version, "2.0.0");

    let parent = website.parent_context.as_ref().unwrap();
    assert_eq!(parent.id, acme.id);
    assert_eq!(parent.context_type, "workspace");
    assert_eq!(parent.path, acme.storage_path);

    let chain = &website.inheritance_chain;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].kind, "workspace");
    assert_eq!(chain[0].id.as_deref(), Some(acme.id.as_str()));
    assert!(chain[1].is_template());
    assert_eq!(chain[1].template.as_deref(), Some("project-template"));
}

#[test]
fn test_grandchild_chain_is_root_first() {
    let (api, _temp_dir) = create_test_api();
    let opts = CreateOptions::default();
    let acme = api
        .create_context("workspace", ContextConfig::named("acme"), None, opts)
        .unwrap();
    let website = api
        .create_context("project", ContextConfig::named("website"), Some(&acme), opts)
        .unwrap();
    let fix = api
        .create_context("task", ContextConfig::named("fix-bug"), Some(&website), opts)
        .unwrap();

    assert!(fix
        .storage_path
        .ends_with("acme/projects/website/tasks/fix-bug/context.yaml"));
    let kinds: Vec<&str> = fix.inheritance_chain.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["workspace", "project", "template"]);
    // ancestors' capabilities accumulate without deduplication
    assert_eq!(fix.capabilities, vec!["organize", "organize", "plan", "execute"]);
}

#[test]
fn test_flat_pattern_ignores_parent() {
    let (api, _temp_dir) = create_test_api();
    let root = api.store().workspace_root().to_path_buf();
    let opts = CreateOptions::default();

    let misc = api
        .create_context("folder", ContextConfig::named("misc"), None, opts)
        .unwrap();
    assert_eq!(misc.storage_path, root.join("folders/misc/context.yaml"));

    let idea = api
        .create_context("note", ContextConfig::named("idea"), Some(&misc), opts)
        .unwrap();
    assert_eq!(idea.storage_path, root.join("notes/idea/context.yaml"));
    assert_eq!(idea.parent_context.as_ref().unwrap().id, misc.id);
}

#[test]
fn test_caller_id_overrides_and_extra_fields() {
    let (api, _temp_dir) = create_test_api();
    let config = ContextConfig::named("acme")
        .with_id("ws-acme")
        .with_field("capabilities", json!(["custom"]))
        .with_field("memoryConfig", json!({"scope": "mine"}))
        .with_field("description", json!("Acme Corp"))
        .with_field("template", json!("not-allowed"));

    let acme = api
        .create_context("workspace", config, None, CreateOptions::default())
        .unwrap();
    assert_eq!(acme.id, "ws-acme");
    assert_eq!(acme.capabilities, vec!["custom"]);
    assert_eq!(acme.memory_config.len(), 1);
    assert_eq!(acme.template, "workspace-template");
    assert_eq!(acme.extra["description"], json!("Acme Corp"));

    let loaded = api.load_context("workspace", "ws-acme").unwrap().unwrap();
    assert_eq!(loaded.extra["description"], json!("Acme Corp"));
    assert_eq!(loaded, acme);
}

#[test]
fn test_unknown_type_fails_without_writing() {
    let (api, _temp_dir) = create_test_api();
    let result = api.create_context(
        "galaxy",
        ContextConfig::named("milky-way"),
        None,
        CreateOptions::default(),
    );
    match result {
        Err(ApiError::TemplateNotFound { context_type, .. }) => assert_eq!(context_type, "galaxy"),
        other => panic!("Expected TemplateNotFound, got {:?}", other),
    }
    assert!(api.store().scan_all().is_empty());
}

#[test]
fn test_lookups() {
    let (api, _temp_dir) = create_test_api();
    let opts = CreateOptions::default();
    let acme = api
        .create_context("workspace", ContextConfig::named("acme"), None, opts)
        .unwrap();
    let site = api
        .create_context("project", ContextConfig::named("site"), Some(&acme), opts)
        .unwrap();
    api.create_context("project", ContextConfig::named("docs"), Some(&acme), opts)
        .unwrap();

    assert_eq!(api.load_context("project", &site.id).unwrap().unwrap(), site);
    assert!(api.load_context("workspace", &site.id).unwrap().is_none());
    assert_eq!(api.load_context_by_id(&acme.id).unwrap().unwrap().id, acme.id);
    assert!(api.load_context_by_id("missing").unwrap().is_none());
    assert_eq!(api.list_contexts("project").unwrap().len(), 2);
    assert!(api.list_contexts("task").unwrap().is_empty());
    assert_eq!(
        api.find_context_by_name("project", "site").unwrap().unwrap().id,
        site.id
    );
}

#[test]
fn test_name_field_is_rejected_before_writing() {
    let (api, _temp_dir) = create_test_api();
    let config = ContextConfig::named("acme").with_field("name", json!("other"));

    match api.create_context("workspace", config, None, CreateOptions::default()) {
        Err(ApiError::InvalidContextField { field, .. }) => assert_eq!(field, "name"),
        other => panic!("Expected InvalidContextField, got {:?}", other),
    }
    assert!(api.store().scan_all().is_empty());

    let acme = api
        .create_context("workspace", ContextConfig::named("acme"), None, CreateOptions::default())
        .unwrap();
    let loaded = api.load_context_by_id(&acme.id).unwrap().unwrap();
    assert_eq!(loaded.name.as_deref(), Some("acme"));
}
