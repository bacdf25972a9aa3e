//! Snapshot model produced by one refresh cycle.
//!
//! A [`Snapshot`] is built wholesale by a [`SnapshotBuilder`] and never
//! edited afterwards; a newer cycle replaces it.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Namespace used when the backend has no namespace feature, and always
/// present in every snapshot.
pub const ROOT_NAMESPACE: &str = "root";

/// Normalize a namespace identifier: empty means root.
pub fn namespace_or_root(namespace: &str) -> &str {
    if namespace.is_empty() {
        ROOT_NAMESPACE
    } else {
        namespace
    }
}

/// Whether the namespace addresses the root scope.
pub fn is_root(namespace: &str) -> bool {
    namespace.is_empty() || namespace == ROOT_NAMESPACE
}

/// The two kinds of mounts tracked per namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountKind {
    /// Authentication methods (`sys/auth`).
    Auth,
    /// Secret engines (`sys/mounts`).
    Secret,
}

impl MountKind {
    /// Logical API path of the mount table.
    pub fn table_path(self) -> &'static str {
        match self {
            MountKind::Auth => "sys/auth",
            MountKind::Secret => "sys/mounts",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MountKind::Auth => "auth_method",
            MountKind::Secret => "secret_engine",
        }
    }
}

/// One mounted auth method or secret engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRecord {
    /// Mount path without the trailing `/`.
    pub name: String,
    /// Backend engine type (`kv`, `userpass`, ...).
    pub engine_type: String,
    /// Raw mount path as reported (`kv/`).
    pub path: String,
    /// Owning namespace.
    pub namespace: String,
}

impl EngineRecord {
    pub fn new(path: &str, engine_type: &str, namespace: &str) -> Self {
        Self {
            name: path.strip_suffix('/').unwrap_or(path).to_string(),
            engine_type: engine_type.to_string(),
            path: path.to_string(),
            namespace: namespace_or_root(namespace).to_string(),
        }
    }
}

/// Immutable result of one refresh cycle.
///
/// Every namespace in `leases`/`tokens` is also in `namespaces` and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub namespaces: Vec<String>,
    pub leases: BTreeMap<String, u64>,
    pub tokens: BTreeMap<String, u64>,
    pub secret_engines: Vec<EngineRecord>,
    pub auth_methods: Vec<EngineRecord>,
    /// `None` until the first cycle completes.
    pub last_refresh: Option<SystemTime>,
    pub last_refresh_duration: Duration,
    pub last_refresh_success: bool,
}

impl Default for Snapshot {
    /// State served before any refresh: the root namespace with zero counts.
    fn default() -> Self {
        let mut leases = BTreeMap::new();
        leases.insert(ROOT_NAMESPACE.to_string(), 0);
        let tokens = leases.clone();
        Self {
            namespaces: vec![ROOT_NAMESPACE.to_string()],
            leases,
            tokens,
            secret_engines: Vec::new(),
            auth_methods: Vec::new(),
            last_refresh: None,
            last_refresh_duration: Duration::ZERO,
            last_refresh_success: false,
        }
    }
}

impl Snapshot {
    pub fn lease_count(&self, namespace: &str) -> u64 {
        self.leases.get(namespace).copied().unwrap_or(0)
    }

    pub fn token_count(&self, namespace: &str) -> u64 {
        self.tokens.get(namespace).copied().unwrap_or(0)
    }

    /// Seconds since the epoch of the last refresh, 0 before the first one.
    pub fn last_refresh_unix(&self) -> u64 {
        self.last_refresh
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Accumulates one cycle's results; the only way to build a non-default
/// [`Snapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    namespaces: Vec<String>,
    leases: BTreeMap<String, u64>,
    tokens: BTreeMap<String, u64>,
    secret_engines: Vec<EngineRecord>,
    auth_methods: Vec<EngineRecord>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a namespace with its counts. Recording the same namespace
    /// again overwrites its counts without duplicating it.
    pub fn namespace(&mut self, namespace: &str, leases: u64, tokens: u64) -> &mut Self {
        let ns = namespace_or_root(namespace).to_string();
        if !self.leases.contains_key(&ns) {
            self.namespaces.push(ns.clone());
        }
        self.leases.insert(ns.clone(), leases);
        self.tokens.insert(ns, tokens);
        self
    }

    pub fn engines(&mut self, kind: MountKind, records: Vec<EngineRecord>) -> &mut Self {
        match kind {
            MountKind::Auth => self.auth_methods.extend(records),
            MountKind::Secret => self.secret_engines.extend(records),
        }
        self
    }

    pub fn finish(self, at: SystemTime, duration: Duration, success: bool) -> Snapshot {
        Snapshot {
            namespaces: self.namespaces,
            leases: self.leases,
            tokens: self.tokens,
            secret_engines: self.secret_engines,
            auth_methods: self.auth_methods,
            last_refresh: Some(at),
            last_refresh_duration: duration,
            last_refresh_success: success,
        }
    }
}
