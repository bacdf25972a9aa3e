use std::sync::{Arc, Mutex, PoisonError};

use vault_usage_core::Snapshot;

/// Holds the currently published snapshot.
///
/// The lock only guards an `Arc` swap: `publish` replaces the pointer and
/// `read` clones it. A reader keeps the snapshot it got even if a newer one
/// is published afterwards, and never sees a half-built one.
pub struct SnapshotStore {
    current: Mutex<Arc<Snapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Starts with [`Snapshot::default`], so reads never need a "not yet
    /// refreshed" branch.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Arc::new(Snapshot::default())),
        }
    }

    pub fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let previous = {
            let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        // the old snapshot may be large; release it outside the lock
        drop(previous);
    }

    pub fn read(&self) -> Arc<Snapshot> {
        let guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}
