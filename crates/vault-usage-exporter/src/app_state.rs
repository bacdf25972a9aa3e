//! Shared application state for the exporter's HTTP surface.
//!
//! Holds the snapshot store (read side only) and exporter self-metrics.
//! Handlers never reach the Vault client.

use std::sync::Arc;

use crate::collector::SnapshotStore;
use crate::obs::{self, ExporterMetrics};

#[derive(Clone)]
pub struct AppState {
    store: Arc<SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
}

impl AppState {
    pub fn new(store: Arc<SnapshotStore>, metrics: Arc<ExporterMetrics>) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Render the current snapshot; the store lock is released before rendering.
    pub fn render_metrics(&self) -> String {
        let snap = self.store.read();
        obs::render(&snap, &self.metrics)
    }
}
