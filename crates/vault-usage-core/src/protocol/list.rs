//! `LIST` response: `{"data": {"keys": ["a", "b/"]}}`.
//!
//! Keys ending in `/` are sub-prefixes; everything else is a leaf.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, VaultUsageError};

/// Path separator marking a sub-prefix key.
pub const SEPARATOR: char = '/';

#[derive(Debug, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Option<ListData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub keys: Vec<Value>,
}

impl ListResponse {
    /// String keys in response order; non-string entries are skipped.
    pub fn into_keys(self) -> Vec<String> {
        self.data
            .map(|d| {
                d.keys
                    .into_iter()
                    .filter_map(|k| match k {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse a list response body. An empty body is an empty listing.
pub fn parse_keys(body: &[u8]) -> Result<Vec<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let resp: ListResponse = serde_json::from_slice(body)
        .map_err(|e| VaultUsageError::Decode(format!("list response: {e}")))?;
    Ok(resp.into_keys())
}

/// Whether a listed key is a sub-prefix that must be listed itself.
pub fn is_prefix(key: &str) -> bool {
    key.ends_with(SEPARATOR)
}
