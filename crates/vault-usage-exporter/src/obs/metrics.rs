//! Exporter metrics and the snapshot emitter.
//!
//! Labels on counters are flattened into sorted key vectors to keep a
//! deterministic ordering; snapshot gauges keep their declared label order.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use vault_usage_core::{EngineRecord, Snapshot};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(labels: &[(&str, &str)]) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

fn sample(out: &mut String, name: &str, labels: &[(&str, &str)], value: impl std::fmt::Display) {
    if labels.is_empty() {
        let _ = writeln!(out, "{} {}", name, value);
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, label_str(labels), value);
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();

        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "counter");
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let labels: Vec<(&str, &str)> =
                    r.key().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                (label_str(&labels), r.value().load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
        }
    }
}

/// Exporter self-metrics.
#[derive(Default)]
pub struct ExporterMetrics {
    pub refreshes: CounterVec,
    pub http_requests: CounterVec,
    draining: AtomicBool,
}

impl ExporterMetrics {
    pub fn record_refresh(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.refreshes.inc(&[("result", result)]);
    }

    pub fn record_request(&self, path: &str, status: u16) {
        let status = status.to_string();
        self.http_requests
            .inc(&[("path", path), ("status", status.as_str())]);
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    fn render(&self, out: &mut String) {
        self.refreshes.render(
            "vault_usage_refresh_total",
            "Completed refresh cycles by result",
            out,
        );
        self.http_requests.render(
            "vault_usage_http_requests_total",
            "HTTP requests served by path and status",
            out,
        );
        header(out, "vault_usage_draining", "Whether the exporter is shutting down (1) or not (0)", "gauge");
        sample(out, "vault_usage_draining", &[], u8::from(self.is_draining()));
    }
}

fn render_engines(out: &mut String, name: &str, help: &str, records: &[EngineRecord]) {
    header(out, name, help, "gauge");
    for e in records {
        sample(
            out,
            name,
            &[
                ("name", e.name.as_str()),
                ("type", e.engine_type.as_str()),
                ("path", e.path.as_str()),
                ("namespace", e.namespace.as_str()),
            ],
            1,
        );
    }
}

/// Render a snapshot plus exporter self-metrics. Pure: no I/O.
pub fn render(snap: &Snapshot, exporter: &ExporterMetrics) -> String {
    let mut out = String::new();

    header(&mut out, "vault_usage_exporter_version", "Exporter version", "gauge");
    sample(&mut out, "vault_usage_exporter_version", &[("version", VERSION)], 1);

    header(
        &mut out,
        "vault_usage_refresh_success",
        "Whether the last refresh succeeded (1) or not (0)",
        "gauge",
    );
    sample(&mut out, "vault_usage_refresh_success", &[], u8::from(snap.last_refresh_success));

    header(
        &mut out,
        "vault_usage_refresh_timestamp_seconds",
        "Unix timestamp of last refresh",
        "gauge",
    );
    sample(&mut out, "vault_usage_refresh_timestamp_seconds", &[], snap.last_refresh_unix());

    header(
        &mut out,
        "vault_usage_refresh_duration_seconds",
        "Duration of last refresh in seconds",
        "gauge",
    );
    sample(
        &mut out,
        "vault_usage_refresh_duration_seconds",
        &[],
        snap.last_refresh_duration.as_secs_f64(),
    );

    header(&mut out, "vault_usage_namespace", "Vault namespace present (1)", "gauge");
    for ns in &snap.namespaces {
        sample(&mut out, "vault_usage_namespace", &[("name", ns.as_str())], 1);
    }

    header(&mut out, "vault_usage_leases", "Vault leases count", "gauge");
    for ns in &snap.namespaces {
        sample(&mut out, "vault_usage_leases", &[("namespace", ns.as_str())], snap.lease_count(ns));
    }

    header(&mut out, "vault_usage_tokens", "Vault tokens count", "gauge");
    for ns in &snap.namespaces {
        sample(&mut out, "vault_usage_tokens", &[("namespace", ns.as_str())], snap.token_count(ns));
    }

    render_engines(
        &mut out,
        "vault_usage_secret_engine",
        "Vault secret engine present (1)",
        &snap.secret_engines,
    );
    render_engines(
        &mut out,
        "vault_usage_auth_method",
        "Vault auth method present (1)",
        &snap.auth_methods,
    );

    exporter.render(&mut out);
    out
}
