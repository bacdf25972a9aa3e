//! Metric rendering.
//!
//! Snapshot gauges are rendered straight from the published snapshot on each
//! scrape; exporter self-metrics are atomics behind `DashMap` label maps.
//! Output is Prometheus text exposition format 0.0.4.

pub mod metrics;

pub use metrics::{render, ExporterMetrics};
