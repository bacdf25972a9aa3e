//! vault-usage core: data model, Vault wire contracts, and the shared error type.
//!
//! This crate defines the snapshot model produced by a refresh cycle, the
//! response shapes read from the Vault HTTP API, and the error surface shared
//! with the exporter. It carries no runtime or network dependencies so the
//! collection pipeline can be exercised against in-memory fakes.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed backend responses surface as `VaultUsageError::Decode`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorClass, Result, VaultUsageError};
pub use model::{EngineRecord, MountKind, Snapshot, SnapshotBuilder, ROOT_NAMESPACE};
