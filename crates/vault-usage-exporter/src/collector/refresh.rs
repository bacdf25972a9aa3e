//! Refresh orchestrator.
//!
//! One cycle: enumerate namespaces, then for each namespace in order count
//! tokens, walk leases, and (when enabled) list auth methods and secret
//! engines. Errors are recorded but never stop the cycle; a failed call
//! contributes zero/nothing for that metric only. The finished snapshot is
//! published in one swap and the first error is returned for logging.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use vault_usage_core::error::{Result, VaultUsageError};
use vault_usage_core::model::ROOT_NAMESPACE;
use vault_usage_core::{MountKind, SnapshotBuilder};

use super::{inventory, leases, SnapshotStore};
use crate::vault::VaultApi;

/// Collector settings, validated by [`Collector::new`].
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Deadline for one whole refresh cycle.
    pub refresh_timeout: Duration,
    pub collect_auth_methods: bool,
    pub collect_secret_engines: bool,
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.refresh_timeout.is_zero() {
            return Err(VaultUsageError::InvalidConfig(
                "refresh_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Cancellation and deadline shared by every backend call of one cycle.
#[derive(Clone)]
pub struct RefreshCtx {
    cancel: CancellationToken,
    deadline: Instant,
}

impl RefreshCtx {
    pub fn new(cancel: CancellationToken, timeout: Duration) -> Self {
        Self {
            cancel,
            deadline: Instant::now() + timeout,
        }
    }

    /// Run `fut` until it finishes, the deadline passes, or the token fires.
    pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(VaultUsageError::Cancelled),
            res = tokio::time::timeout_at(self.deadline, fut) => match res {
                Ok(inner) => inner,
                Err(_) => Err(VaultUsageError::DeadlineExceeded),
            },
        }
    }
}

/// First error of a cycle plus a count, for the success flag and logs.
#[derive(Default)]
struct CycleErrors {
    first: Option<VaultUsageError>,
    count: usize,
}

impl CycleErrors {
    fn record(&mut self, namespace: &str, what: &'static str, err: VaultUsageError) {
        tracing::warn!(namespace, resource = what, class = err.class().as_str(), error = %err, "collection failed");
        self.count += 1;
        if self.first.is_none() {
            self.first = Some(err);
        }
    }
}

/// Background collector: refreshes from Vault and publishes snapshots.
pub struct Collector<A> {
    api: A,
    cancel: CancellationToken,
    cfg: CollectorConfig,
    store: Arc<SnapshotStore>,
    span: tracing::Span,
}

impl<A: VaultApi> Collector<A> {
    pub fn new(
        api: A,
        cancel: CancellationToken,
        cfg: CollectorConfig,
        store: Arc<SnapshotStore>,
    ) -> Result<Self> {
        cfg.validate()?;
        let span = tracing::info_span!(
            "vault_usage_collector",
            auth_methods = cfg.collect_auth_methods,
            secret_engines = cfg.collect_secret_engines
        );
        Ok(Self {
            api,
            cancel,
            cfg,
            store,
            span,
        })
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run one refresh cycle and publish its snapshot.
    ///
    /// Returns the first error of the cycle. Nothing is published when the
    /// token was already cancelled on entry.
    pub async fn refresh(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(VaultUsageError::Cancelled);
        }
        let span = tracing::debug_span!(parent: &self.span, "vault_usage_refresh");
        self.refresh_inner().instrument(span).await
    }

    async fn refresh_inner(&self) -> Result<()> {
        let start = Instant::now();
        let ctx = RefreshCtx::new(self.cancel.clone(), self.cfg.refresh_timeout);
        let mut errors = CycleErrors::default();

        let namespaces = match ctx.run(inventory::list_namespaces(&self.api)).await {
            Ok(ns) => ns,
            Err(e) => {
                errors.record(ROOT_NAMESPACE, "namespaces", e);
                tracing::debug!("falling back to root namespace");
                vec![ROOT_NAMESPACE.to_string()]
            }
        };
        tracing::debug!(count = namespaces.len(), "finished fetching namespaces");

        let mut builder = SnapshotBuilder::new();
        for ns in &namespaces {
            let tokens = match ctx.run(inventory::count_tokens(&self.api, ns)).await {
                Ok(n) => n,
                Err(e) => {
                    errors.record(ns, "tokens", e);
                    0
                }
            };

            let lease_count = match ctx.run(leases::count_leases(&self.api, ns)).await {
                Ok(n) => n,
                Err(e) => {
                    errors.record(ns, "leases", e);
                    0
                }
            };
            tracing::debug!(namespace = %ns, leases = lease_count, tokens, "counted namespace");
            builder.namespace(ns, lease_count, tokens);

            if self.cfg.collect_auth_methods {
                self.collect_engines(&ctx, ns, MountKind::Auth, &mut builder, &mut errors)
                    .await;
            }
            if self.cfg.collect_secret_engines {
                self.collect_engines(&ctx, ns, MountKind::Secret, &mut builder, &mut errors)
                    .await;
            }
        }

        let duration = start.elapsed();
        let success = errors.first.is_none();
        self.store
            .publish(builder.finish(SystemTime::now(), duration, success));

        match errors.first {
            None => {
                tracing::debug!(duration_ms = duration.as_millis() as u64, "refresh completed");
                Ok(())
            }
            Some(e) => {
                tracing::debug!(
                    duration_ms = duration.as_millis() as u64,
                    failures = errors.count,
                    error = %e,
                    "refresh completed with errors"
                );
                Err(e)
            }
        }
    }

    async fn collect_engines(
        &self,
        ctx: &RefreshCtx,
        ns: &str,
        kind: MountKind,
        builder: &mut SnapshotBuilder,
        errors: &mut CycleErrors,
    ) {
        match ctx.run(inventory::list_engines(&self.api, ns, kind)).await {
            Ok(records) => {
                tracing::debug!(namespace = %ns, kind = kind.as_str(), count = records.len(), "listed mounts");
                builder.engines(kind, records);
            }
            Err(e) => errors.record(ns, kind.as_str(), e),
        }
    }
}
