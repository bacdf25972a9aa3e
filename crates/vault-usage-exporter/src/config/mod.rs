//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use vault_usage_core::error::{Result, VaultUsageError};

pub use schema::{
    EngineToggle, ExporterConfig, ExporterSection, ServerSection, TOKEN_ENV,
};

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| VaultUsageError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let mut cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| VaultUsageError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.apply_defaults();
    cfg.validate()?;
    Ok(cfg)
}
