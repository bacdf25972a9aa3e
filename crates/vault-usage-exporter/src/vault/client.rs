//! HTTP implementation of [`VaultApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use vault_usage_core::error::{Result, VaultUsageError};
use vault_usage_core::protocol::{self, list, mounts, mounts::MountTable};
use vault_usage_core::MountKind;

use super::VaultApi;

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Vault HTTP client. Cloning is cheap: the connection pool, address, and
/// token are shared; only the namespace is per handle.
#[derive(Clone)]
pub struct VaultClient {
    http: Client,
    base: Arc<Url>,
    token: Arc<str>,
    namespace: Option<Arc<str>>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("base", &self.base.as_str())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    pub fn new(
        address: &str,
        token: impl Into<String>,
        request_timeout: Duration,
        tls_skip_verify: bool,
    ) -> Result<Self> {
        let mut base = Url::parse(address)
            .map_err(|e| VaultUsageError::InvalidConfig(format!("vault address: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let base = base
            .join("v1/")
            .map_err(|e| VaultUsageError::InvalidConfig(format!("vault address: {e}")))?;

        let http = Client::builder()
            .timeout(request_timeout)
            .danger_accept_invalid_certs(tls_skip_verify)
            .build()
            .map_err(|e| VaultUsageError::Internal(format!("build http client: {e}")))?;

        Ok(Self {
            http,
            base: Arc::new(base),
            token: Arc::from(token.into()),
            namespace: None,
        })
    }

    /// Append `path` to the API base one segment at a time.
    ///
    /// Keys come from the backend, so every segment is percent-encoded as
    /// data (`#`, `?` stay in the path). Dot segments are refused: they
    /// would resolve outside the listed prefix. A trailing `/` is kept.
    fn url(&self, path: &str) -> Result<Url> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if segments.iter().any(|s| matches!(*s, "." | "..")) {
            return Err(VaultUsageError::Decode(format!("dot segment in path {path}")));
        }

        let mut url = Url::clone(&self.base);
        url.path_segments_mut()
            .map_err(|_| VaultUsageError::Internal(format!("vault address cannot carry path {path}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, path: &str, list: bool) -> Result<Vec<u8>> {
        let mut req = self
            .http
            .get(self.url(path)?)
            .header(TOKEN_HEADER, self.token.as_ref());
        if list {
            req = req.query(&[("list", "true")]);
        }
        if let Some(ns) = &self.namespace {
            req = req.header(NAMESPACE_HEADER, ns.as_ref());
        }

        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(transport_error)?;

        match status {
            s if s.is_success() => Ok(body.to_vec()),
            StatusCode::NOT_FOUND => Err(VaultUsageError::NotFound(path.to_string())),
            StatusCode::FORBIDDEN => Err(VaultUsageError::Forbidden(path.to_string())),
            s => Err(VaultUsageError::Status {
                status: s.as_u16(),
                path: path.to_string(),
                message: protocol::error_message(&body),
            }),
        }
    }
}

fn transport_error(e: reqwest::Error) -> VaultUsageError {
    if e.is_timeout() {
        VaultUsageError::DeadlineExceeded
    } else {
        VaultUsageError::Transport(e.to_string())
    }
}

#[async_trait]
impl VaultApi for VaultClient {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn with_namespace(&self, namespace: &str) -> Self {
        let mut scoped = self.clone();
        scoped.namespace = Some(Arc::from(namespace));
        scoped
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        let body = self.get(path, true).await?;
        list::parse_keys(&body)
    }

    async fn mounts(&self, kind: MountKind) -> Result<MountTable> {
        let body = self.get(kind.table_path(), false).await?;
        mounts::parse_mounts(&body)
    }
}
