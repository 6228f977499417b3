//! Metrics definitions for the Media Gateway.
//!
//! All metrics follow Prometheus naming conventions: `mg_` prefix and a
//! `_total` suffix for counters. No labels carry caller-supplied values, so
//! cardinality stays bounded.
//!
//! Recording through the `metrics` facade is a no-op until a recorder is
//! installed (done in `main`), which keeps tests free of global state.

use metrics::counter;

/// Record a successfully issued access token.
///
/// Metric: `mg_tokens_issued_total`
pub fn record_token_issued() {
    counter!("mg_tokens_issued_total").increment(1);
}

/// Record a successfully started egress job.
///
/// Metric: `mg_egress_starts_total`
pub fn record_egress_start() {
    counter!("mg_egress_starts_total").increment(1);
}

/// Record a successfully stopped egress job.
///
/// Metric: `mg_egress_stops_total`
pub fn record_egress_stop() {
    counter!("mg_egress_stops_total").increment(1);
}
