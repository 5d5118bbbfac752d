use std::sync::Arc;

use parking_lot::RwLock;

use stickfit_core::CatalogSnapshot;

/// Shared handle to the current catalog snapshot.
///
/// Readers take an `Arc` clone and keep using it for the whole request even
/// if a refresh lands mid-flight; replacement is a pointer swap under a
/// short write lock, never an in-place mutation of a published snapshot.
pub struct SnapshotStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { current: RwLock::new(Arc::new(snapshot)) }
    }

    /// The snapshot to serve this request from.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Publish a freshly built snapshot and return it.
    pub fn replace(&self, snapshot: CatalogSnapshot) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = snapshot.clone();
        tracing::info!(
            event_name = "catalog.snapshot_replaced",
            rows = snapshot.len(),
            source = snapshot.source(),
            "catalog snapshot replaced"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_the_snapshot_for_new_readers() {
        let store = SnapshotStore::new(CatalogSnapshot::new(Vec::new(), "first"));
        assert_eq!(store.current().source(), "first");

        store.replace(CatalogSnapshot::new(Vec::new(), "second"));
        assert_eq!(store.current().source(), "second");
    }

    #[test]
    fn in_flight_readers_keep_their_snapshot_across_a_swap() {
        let store = SnapshotStore::new(CatalogSnapshot::new(Vec::new(), "first"));
        let held = store.current();

        store.replace(CatalogSnapshot::new(Vec::new(), "second"));

        assert_eq!(held.source(), "first");
        assert_eq!(store.current().source(), "second");
    }
}
