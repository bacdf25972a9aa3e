use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use vault_usage_core::error::{Result, VaultUsageError};

use crate::collector::CollectorConfig;

/// Environment variable consulted when `server.token` is absent.
pub const TOKEN_ENV: &str = "VAULT_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub auth_methods: EngineToggle,

    #[serde(default)]
    pub secret_engines: EngineToggle,

    #[serde(default)]
    pub exporter: ExporterSection,
}

impl ExporterConfig {
    /// Zero intervals mean "use the default", matching how operators blank the field.
    pub fn apply_defaults(&mut self) {
        if self.exporter.collection_interval.is_zero() {
            self.exporter.collection_interval = default_collection_interval();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VaultUsageError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.exporter.validate()?;
        Ok(())
    }

    pub fn collector(&self) -> CollectorConfig {
        CollectorConfig {
            refresh_timeout: self.exporter.refresh_timeout,
            collect_auth_methods: self.auth_methods.enabled,
            collect_secret_engines: self.secret_engines.enabled,
        }
    }

    /// `server.token`, else `VAULT_TOKEN`.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(t) = self.server.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(t.to_string());
        }
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(VaultUsageError::MissingField("server.token"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: String::new(),
            token: None,
            request_timeout: default_request_timeout(),
            tls_skip_verify: false,
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(VaultUsageError::MissingField("server.address"));
        }
        let url = Url::parse(&self.address).map_err(|e| {
            VaultUsageError::InvalidConfig(format!("server.address is not a valid url: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(VaultUsageError::InvalidConfig(
                "server.address must use http or https".into(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(VaultUsageError::InvalidConfig(
                "server.request_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineToggle {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(with = "humantime_serde", default = "default_collection_interval")]
    pub collection_interval: Duration,

    #[serde(with = "humantime_serde", default = "default_refresh_timeout")]
    pub refresh_timeout: Duration,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            collection_interval: default_collection_interval(),
            refresh_timeout: default_refresh_timeout(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.refresh_timeout.is_zero() {
            return Err(VaultUsageError::InvalidConfig(
                "exporter.refresh_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            VaultUsageError::InvalidConfig("exporter.listen must be a valid socket address".into())
        })
    }
}

fn default_version() -> u32 {
    1
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}
fn default_listen() -> String {
    "0.0.0.0:9090".into()
}
fn default_collection_interval() -> Duration {
    Duration::from_secs(30)
}
fn default_refresh_timeout() -> Duration {
    Duration::from_secs(10)
}
