//! Observability support (Prometheus metrics).

pub mod metrics;
