//! Vault backend access.
//!
//! `VaultApi` is the capability set the collection pipeline needs; the HTTP
//! implementation lives in [`client`]. Handles are scoped to one namespace:
//! a scoped handle is an independent clone, so concurrent calls for
//! different namespaces never share a mutable "current namespace".

pub mod client;

use std::borrow::Cow;

use async_trait::async_trait;

use vault_usage_core::error::Result;
use vault_usage_core::model::is_root;
use vault_usage_core::protocol::mounts::MountTable;
use vault_usage_core::MountKind;

pub use client::VaultClient;

/// Logical path listing namespaces.
pub const NAMESPACES_PATH: &str = "sys/namespaces";
/// Root of the lease key space.
pub const LEASE_ROOT: &str = "sys/leases/lookup/";
/// Token accessor listing.
pub const TOKEN_ACCESSORS_PATH: &str = "auth/token/accessors";

/// Backend operations used by the collector.
///
/// Implementations report 404 as `VaultUsageError::NotFound` and 403 as
/// `VaultUsageError::Forbidden`; callers decide what those mean.
#[async_trait]
pub trait VaultApi: Clone + Send + Sync + 'static {
    /// Namespace this handle is scoped to; `None` for root.
    fn namespace(&self) -> Option<&str>;

    /// Independent handle scoped to `namespace`. Must not affect `self`.
    fn with_namespace(&self, namespace: &str) -> Self;

    /// List keys at a logical path.
    async fn list(&self, path: &str) -> Result<Vec<String>>;

    /// Read a mount table.
    async fn mounts(&self, kind: MountKind) -> Result<MountTable>;
}

/// Handle for `namespace`: the shared handle for root, a private clone otherwise.
pub fn scoped<'a, A: VaultApi>(api: &'a A, namespace: &str) -> Cow<'a, A> {
    if is_root(namespace) {
        Cow::Borrowed(api)
    } else {
        Cow::Owned(api.with_namespace(namespace))
    }
}
