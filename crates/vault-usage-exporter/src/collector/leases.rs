//! Lease key-space walker.
//!
//! Lease ids live under `sys/leases/lookup/` in a tree whose inner nodes are
//! keys ending in `/`. The walk is breadth-first over an explicit queue so
//! depth never translates into stack use.

use std::collections::{HashSet, VecDeque};

use vault_usage_core::error::Result;
use vault_usage_core::protocol::list::is_prefix;

use crate::vault::{scoped, VaultApi, LEASE_ROOT};

/// Count leaf leases in `namespace`.
///
/// Each prefix is listed at most once. A 404 or 403 anywhere in the walk
/// resolves the whole namespace to 0, not to a partial sum.
pub async fn count_leases<A: VaultApi>(api: &A, namespace: &str) -> Result<u64> {
    let client = scoped(api, namespace);

    let mut queue: VecDeque<String> = VecDeque::from([String::new()]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut leaves: u64 = 0;

    while let Some(prefix) = queue.pop_front() {
        if !visited.insert(prefix.clone()) {
            continue;
        }

        let path = format!("{LEASE_ROOT}{prefix}");
        let keys = match client.list(&path).await {
            Ok(keys) => keys,
            Err(e) if e.is_not_visible() => {
                tracing::debug!(namespace, prefix = %prefix, class = e.class().as_str(), "lease subtree not visible");
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        for key in keys {
            if is_prefix(&key) {
                queue.push_back(format!("{prefix}{key}"));
            } else {
                leaves += 1;
            }
        }
    }

    Ok(leaves)
}
