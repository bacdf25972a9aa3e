//! vault-usage exporter library entry.
//!
//! Wires the Vault client, the snapshot-based collector, and the HTTP
//! surface. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod vault;
