//! HTTP request handlers.

pub mod egress;
pub mod health;
pub mod metrics;
pub mod tokens;
