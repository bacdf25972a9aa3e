//! Namespace enumeration, mount listing, and token counting.

use vault_usage_core::error::Result;
use vault_usage_core::model::{namespace_or_root, ROOT_NAMESPACE};
use vault_usage_core::protocol::list::SEPARATOR;
use vault_usage_core::{EngineRecord, MountKind};

use crate::vault::{scoped, VaultApi, NAMESPACES_PATH, TOKEN_ACCESSORS_PATH};

/// Namespaces known to the backend, root first.
///
/// Root is always included exactly once; a 404 (namespaces unsupported or
/// not visible) yields just root. Other errors propagate.
pub async fn list_namespaces<A: VaultApi>(api: &A) -> Result<Vec<String>> {
    let keys = match api.list(NAMESPACES_PATH).await {
        Ok(keys) => keys,
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => return Err(e),
    };

    let mut namespaces = Vec::with_capacity(keys.len() + 1);
    namespaces.push(ROOT_NAMESPACE.to_string());
    for key in keys {
        let ns = key.trim_end_matches(SEPARATOR);
        if ns.is_empty() || namespaces.iter().any(|n| n == ns) {
            continue;
        }
        namespaces.push(ns.to_string());
    }
    Ok(namespaces)
}

/// Mounts of one kind in `namespace`. A 404 yields an empty list.
pub async fn list_engines<A: VaultApi>(
    api: &A,
    namespace: &str,
    kind: MountKind,
) -> Result<Vec<EngineRecord>> {
    let client = scoped(api, namespace);
    let table = match client.mounts(kind).await {
        Ok(table) => table,
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let namespace = namespace_or_root(namespace);
    Ok(table
        .iter()
        .map(|(path, desc)| EngineRecord::new(path, &desc.engine_type, namespace))
        .collect())
}

pub async fn list_auth_methods<A: VaultApi>(api: &A, namespace: &str) -> Result<Vec<EngineRecord>> {
    list_engines(api, namespace, MountKind::Auth).await
}

pub async fn list_secret_engines<A: VaultApi>(
    api: &A,
    namespace: &str,
) -> Result<Vec<EngineRecord>> {
    list_engines(api, namespace, MountKind::Secret).await
}

/// Number of token accessors in `namespace`; 404/403 count as zero.
pub async fn count_tokens<A: VaultApi>(api: &A, namespace: &str) -> Result<u64> {
    let client = scoped(api, namespace);
    match client.list(TOKEN_ACCESSORS_PATH).await {
        Ok(keys) => Ok(keys.len() as u64),
        Err(e) if e.is_not_visible() => Ok(0),
        Err(e) => Err(e),
    }
}
