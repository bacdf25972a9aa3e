//! Snapshot-based collection pipeline.
//!
//! A background refresh cycle ([`Collector::refresh`]) talks to Vault and
//! publishes an immutable [`Snapshot`](vault_usage_core::Snapshot) into the
//! [`SnapshotStore`]. Scrapes only read the store.

pub mod inventory;
pub mod leases;
pub mod refresh;
pub mod scheduler;
pub mod store;

pub use refresh::{Collector, CollectorConfig, RefreshCtx};
pub use scheduler::spawn_scheduler;
pub use store::SnapshotStore;
