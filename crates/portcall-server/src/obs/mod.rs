//! Lightweight in-process metrics.
//!
//! Metrics are stored as atomics keyed by label sets and rendered as
//! Prometheus text by the `metrics` endpoint.

pub mod metrics;

pub use metrics::DispatchMetrics;
