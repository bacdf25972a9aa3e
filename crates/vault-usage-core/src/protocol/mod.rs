//! Vault HTTP API response shapes read by the exporter.
//!
//! - `list`: `LIST`/`?list=true` responses (`data.keys`).
//! - `mounts`: mount tables from `sys/auth` and `sys/mounts`.
//!
//! All parsers are panic-free: malformed bodies are reported as
//! `VaultUsageError::Decode`. Unknown fields are tolerated because Vault
//! adds response metadata (`request_id`, `lease_id`, ...) freely.

pub mod list;
pub mod mounts;

use serde::Deserialize;

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Best-effort message extraction from an error response body.
pub fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(b) if !b.errors.is_empty() => b.errors.join("; "),
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}
