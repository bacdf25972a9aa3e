//! Mount tables (`sys/auth`, `sys/mounts`).
//!
//! Vault returns each mount both under `data` and, for older clients, at the
//! top level next to response metadata. `data` wins when present.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, VaultUsageError};

/// One entry of a mount table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MountDescriptor {
    /// Engine type (JSON field `type`).
    #[serde(rename = "type")]
    pub engine_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accessor: String,
}

/// Mount path -> descriptor, ordered by path.
pub type MountTable = BTreeMap<String, MountDescriptor>;

#[derive(Debug, Deserialize)]
struct MountsResponse {
    #[serde(default)]
    data: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    top_level: BTreeMap<String, Value>,
}

/// Parse a mount table body.
pub fn parse_mounts(body: &[u8]) -> Result<MountTable> {
    let resp: MountsResponse = serde_json::from_slice(body)
        .map_err(|e| VaultUsageError::Decode(format!("mount table: {e}")))?;

    let entries = match resp.data {
        Some(data) => data,
        None => resp.top_level,
    };

    let mut table = MountTable::new();
    for (path, value) in entries {
        // metadata fields (request_id, lease_duration, ...) are not objects with a type
        if !value.get("type").is_some_and(Value::is_string) {
            continue;
        }
        let desc: MountDescriptor = serde_json::from_value(value)
            .map_err(|e| VaultUsageError::Decode(format!("mount {path}: {e}")))?;
        table.insert(path, desc);
    }
    Ok(table)
}
