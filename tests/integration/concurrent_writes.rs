//! Concurrent relationship writes against one source context

use super::test_utils::{create_test_api, create_test_api_with_locks};
use serde_json::Map;
use std::sync::Arc;
use std::thread;
use stratum::containment::CreateOptions;
use stratum::context::ContextConfig;
use stratum::error::ApiError;
use stratum::relationship::AddOptions;

#[test]
fn test_concurrent_adds_to_one_source_are_all_kept() {
    let (api, _temp_dir) = create_test_api();
    let api = Arc::new(api);

    let source = api
        .create_context("task", ContextConfig::named("hub"), None, CreateOptions::default())
        .unwrap();
    let targets: Vec<String> = (0..8)
        .map(|i| {
            api.create_context(
                "note",
                ContextConfig::named(format!("n{}", i)),
                None,
                CreateOptions::default(),
            )
            .unwrap()
            .id
        })
        .collect();

    let handles: Vec<_> = targets
        .iter()
        .cloned()
        .map(|target| {
            let api = Arc::clone(&api);
            let source_id = source.id.clone();
            thread::spawn(move || {
                api.add_relationship(&source_id, "references", &target, Map::new(), AddOptions::default())
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = api.load_context_by_id(&source.id).unwrap().unwrap();
    assert_eq!(stored.relationship_entries("references").len(), targets.len());
    for target in &targets {
        assert!(stored.has_relationship("references", target));
    }
}

#[test]
fn test_lock_table_does_not_grow_with_requested_ids() {
    let (api, locks, _temp_dir) = create_test_api_with_locks();
    let a = api
        .create_context("task", ContextConfig::named("a"), None, CreateOptions::default())
        .unwrap();
    let b = api
        .create_context("task", ContextConfig::named("b"), None, CreateOptions::default())
        .unwrap();
    assert!(locks.is_empty());

    for i in 0..20 {
        let ghost = format!("ghost-{}", i);
        assert!(matches!(
            api.remove_relationship(&ghost, "depends_on", &a.id),
            Err(ApiError::ContextNotFound(_))
        ));
    }
    assert_eq!(locks.len(), 0);

    api.add_relationship(&a.id, "depends_on", &b.id, Map::new(), AddOptions::default())
        .unwrap();
    api.remove_relationship(&a.id, "depends_on", &b.id).unwrap();
    assert!(locks.is_empty());
}
