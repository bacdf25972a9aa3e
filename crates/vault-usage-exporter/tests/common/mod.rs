//! In-memory `VaultApi` fake shared by integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vault_usage_core::error::{Result, VaultUsageError};
use vault_usage_core::protocol::mounts::{MountDescriptor, MountTable};
use vault_usage_core::MountKind;
use vault_usage_exporter::vault::VaultApi;

/// Canned answer for one (namespace, path).
#[derive(Clone)]
pub enum Reply {
    Keys(Vec<String>),
    Mounts(MountTable),
    NotFound,
    Forbidden,
    Fail(u16),
    Hang,
}

#[derive(Default)]
struct FakeState {
    replies: Mutex<HashMap<(String, String), Reply>>,
    calls: Mutex<Vec<(String, String)>>,
}

/// Cloning shares the canned state; the namespace is per handle, as with
/// the HTTP client. Unknown paths answer 404 like Vault does.
#[derive(Clone, Default)]
pub struct FakeVault {
    state: Arc<FakeState>,
    namespace: Option<String>,
}

impl FakeVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, ns: &str, path: &str, reply: Reply) -> Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert((ns.to_string(), path.to_string()), reply);
        self
    }

    pub fn keys(self, ns: &str, path: &str, keys: &[&str]) -> Self {
        self.reply(ns, path, Reply::Keys(keys.iter().map(|k| k.to_string()).collect()))
    }

    pub fn mounts(self, ns: &str, kind: MountKind, entries: &[(&str, &str)]) -> Self {
        let table = entries
            .iter()
            .map(|(path, ty)| {
                (
                    path.to_string(),
                    MountDescriptor {
                        engine_type: ty.to_string(),
                        description: String::new(),
                        accessor: format!("{ty}_accessor"),
                    },
                )
            })
            .collect();
        self.reply(ns, kind.table_path(), Reply::Mounts(table))
    }

    /// Every call as (namespace, path), in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, ns: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(n, p)| n == ns && p == path)
            .count()
    }

    fn current_ns(&self) -> String {
        self.namespace.clone().unwrap_or_else(|| "root".to_string())
    }

    async fn answer(&self, path: &str) -> Result<Reply> {
        let ns = self.current_ns();
        self.state
            .calls
            .lock()
            .unwrap()
            .push((ns.clone(), path.to_string()));

        let reply = self
            .state
            .replies
            .lock()
            .unwrap()
            .get(&(ns, path.to_string()))
            .cloned()
            .unwrap_or(Reply::NotFound);

        match reply {
            Reply::NotFound => Err(VaultUsageError::NotFound(path.to_string())),
            Reply::Forbidden => Err(VaultUsageError::Forbidden(path.to_string())),
            Reply::Fail(status) => Err(VaultUsageError::Status {
                status,
                path: path.to_string(),
                message: "fake failure".to_string(),
            }),
            Reply::Hang => std::future::pending().await,
            other => Ok(other),
        }
    }
}

#[async_trait]
impl VaultApi for FakeVault {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn with_namespace(&self, namespace: &str) -> Self {
        Self {
            state: Arc::clone(&self.state),
            namespace: Some(namespace.to_string()),
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        match self.answer(path).await? {
            Reply::Keys(keys) => Ok(keys),
            _ => Err(VaultUsageError::Decode(format!("{path} is not a listing"))),
        }
    }

    async fn mounts(&self, kind: MountKind) -> Result<MountTable> {
        match self.answer(kind.table_path()).await? {
            Reply::Mounts(table) => Ok(table),
            _ => Err(VaultUsageError::Decode(format!("{} is not a mount table", kind.table_path()))),
        }
    }
}

/// Two namespaces: root with 3 leases / 2 tokens, team-a with 0 / 1.
pub fn two_namespace_vault() -> FakeVault {
    FakeVault::new()
        .keys("root", "sys/namespaces", &["team-a/"])
        .keys("root", "sys/leases/lookup/", &["auth/", "database/"])
        .keys("root", "sys/leases/lookup/auth/", &["token/"])
        .keys("root", "sys/leases/lookup/auth/token/", &["create/"])
        .keys("root", "sys/leases/lookup/auth/token/create/", &["h1", "h2"])
        .keys("root", "sys/leases/lookup/database/", &["d1"])
        .keys("root", "auth/token/accessors", &["acc1", "acc2"])
        .keys("team-a", "auth/token/accessors", &["acc3"])
        .mounts("root", MountKind::Auth, &[("token/", "token")])
        .mounts("root", MountKind::Secret, &[("kv/", "kv"), ("sys/", "system")])
        .mounts("team-a", MountKind::Auth, &[("userpass/", "userpass")])
        .mounts("team-a", MountKind::Secret, &[("transit/", "transit")])
}
