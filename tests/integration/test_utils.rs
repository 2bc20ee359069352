//! Shared test utilities for integration tests
//!
//! Template fixtures, API construction, and XDG environment isolation.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use stratum::concurrency::ContextLockManager;
use stratum::storage::ContextStore;
use stratum::template::FsTemplateSource;
use stratum::ContextApi;
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

pub const WORKSPACE_TEMPLATE: &str = r#"
metadata:
  id: workspace-template
  version: "1.0.0"
workspace_config:
  structure_config:
    storage_pattern: hierarchical
    path_template: "{name}"
  capabilities: [organize]
  behavior_rules: [keep-tidy]
  memory_config:
    scope: workspace
    retention: long
  allowed_children: [project]
"#;

pub const PROJECT_TEMPLATE: &str = r#"
metadata:
  id: project-template
  version: "2.0.0"
project_config:
  structure_config:
    storage_pattern: hierarchical
    path_template: "projects/{name}"
  capabilities: [plan]
  behavior_rules: [ship-it]
  memory_config:
    scope: project
  allowed_children: [task, folder]
  relationship_types:
    depends_on:
      bidirectional: true
      inverse: blocks
      target_types: [project, task]
    blocks:
      bidirectional: true
      inverse: depends_on
      target_types: [project, task]
    owned_by:
      bidirectional: false
      target_types: [workspace]
"#;

pub const TASK_TEMPLATE: &str = r#"
metadata:
  id: task-template
task_config:
  structure_config:
    storage_pattern: hierarchical
  capabilities: [execute]
  allowed_children: []
  relationship_types:
    depends_on:
      bidirectional: true
      inverse: blocks
      target_types: [task, project]
    blocks:
      bidirectional: true
      inverse: depends_on
      target_types: ["*"]
"#;

pub const FOLDER_TEMPLATE: &str = r#"
metadata:
  id: folder-template
folder_config:
  structure_config:
    storage_pattern: mixed
  allowed_children: ["*"]
"#;

pub const NOTE_TEMPLATE: &str = r#"
metadata:
  id: note-template
note_config:
  structure_config:
    storage_pattern: flat
    path_template: "notes/{name}"
  capabilities: [remember]
"#;

pub const BASE_TEMPLATE: &str = r#"
metadata:
  id: base-template
base_config:
  universal_relationships:
    related_to:
      bidirectional: true
      inverse: related_to
    references:
      bidirectional: false
"#;

/// Write `<root>/types/<type>/context.yaml`.
pub fn write_template(template_root: &Path, context_type: &str, body: &str) {
    let dir = template_root.join("types").join(context_type);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("context.yaml"), body).unwrap();
}

/// Write the workspace/project/task/folder/note/base templates.
pub fn write_standard_templates(template_root: &Path) {
    write_template(template_root, "workspace", WORKSPACE_TEMPLATE);
    write_template(template_root, "project", PROJECT_TEMPLATE);
    write_template(template_root, "task", TASK_TEMPLATE);
    write_template(template_root, "folder", FOLDER_TEMPLATE);
    write_template(template_root, "note", NOTE_TEMPLATE);
    write_template(template_root, "base", BASE_TEMPLATE);
}

/// API over `<tmp>/contexts` templates and a `<tmp>/workspace` store.
pub fn create_test_api() -> (ContextApi, TempDir) {
    let (api, _locks, temp_dir) = create_test_api_with_locks();
    (api, temp_dir)
}

/// Like [`create_test_api`], also returning the lock manager the API uses.
pub fn create_test_api_with_locks() -> (ContextApi, Arc<ContextLockManager>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let template_root = temp_dir.path().join("contexts");
    write_standard_templates(&template_root);

    let store = Arc::new(ContextStore::new(temp_dir.path().join("workspace")).unwrap());
    let locks = Arc::new(ContextLockManager::new());
    let api = ContextApi::new(
        Arc::new(FsTemplateSource::new(&template_root)),
        store,
        Arc::clone(&locks),
    );
    (api, locks, temp_dir)
}

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir`.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();
    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().join("xdg"));

    let result = f();

    env_state.restore();
    result
}
