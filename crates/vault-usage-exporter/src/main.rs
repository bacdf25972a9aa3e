//! vault-usage-exporter
//!
//! - Background refresh of Vault usage (namespaces, mounts, leases, tokens)
//! - `/metrics` served from the last published snapshot
//! - `/healthz`, `/readyz`
//! - Graceful shutdown on SIGINT/SIGTERM

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use vault_usage_core::error::{Result, VaultUsageError};
use vault_usage_exporter::{
    app_state::AppState,
    collector::{spawn_scheduler, Collector, SnapshotStore},
    config,
    obs::ExporterMetrics,
    router,
    vault::VaultClient,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, Parser)]
#[command(version, about = "Prometheus exporter for Vault usage")]
struct Args {
    /// Path to the YAML config file.
    #[arg(long, default_value = "vault-usage-exporter.yaml")]
    config: String,

    /// Listen address, overrides `exporter.listen`.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(class = e.class().as_str(), error = %e, "vault-usage-exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut cfg = config::load_from_file(&args.config)?;
    if let Some(listen) = args.listen {
        cfg.exporter.listen = listen;
        cfg.validate()?;
    }
    let listen = cfg.exporter.listen_addr()?;

    let client = VaultClient::new(
        &cfg.server.address,
        cfg.resolve_token()?,
        cfg.server.request_timeout,
        cfg.server.tls_skip_verify,
    )?;

    let shutdown = CancellationToken::new();
    let store = Arc::new(SnapshotStore::new());
    let metrics = Arc::new(ExporterMetrics::default());

    let collector = Arc::new(Collector::new(
        client,
        shutdown.clone(),
        cfg.collector(),
        Arc::clone(&store),
    )?);
    let scheduler = spawn_scheduler(
        collector,
        cfg.exporter.collection_interval,
        Arc::clone(&metrics),
    );

    let state = AppState::new(store, Arc::clone(&metrics));
    let app = router::build_router(state);

    tracing::info!(%listen, vault = %cfg.server.address, "vault-usage-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| VaultUsageError::Internal(format!("bind {listen} failed: {e}")))?;

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("received shutdown signal");
            metrics.set_draining();
            signal_token.cancel();
        })
        .await
        .map_err(|e| VaultUsageError::Internal(format!("server failed: {e}")))?;

    // server may also stop on its own; make sure the scheduler sees it
    shutdown.cancel();
    if tokio::time::timeout(SHUTDOWN_GRACE, scheduler).await.is_err() {
        tracing::warn!("refresh scheduler did not stop in time");
    }

    tracing::info!("exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
