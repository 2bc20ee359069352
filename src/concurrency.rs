//! Per-context write serialization.
//!
//! Every mutation of a stored context is a load-modify-save cycle. Holding the
//! context's lock for the whole cycle keeps two writers in this process from
//! silently discarding each other's changes.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Hands out one lock per context id.
#[derive(Default)]
pub struct ContextLockManager {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContextLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the lock guarding `context_id`.
    pub fn get_lock(&self, context_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry(context_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drop locks no caller currently holds.
    pub fn prune(&self) {
        self.locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked context ids.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
