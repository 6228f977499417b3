//! Media Gateway (MG) Service Library
//!
//! A control-plane facade in front of a real-time audio/video media server.
//! The gateway issues short-lived, capability-scoped access tokens for
//! joining rooms and orchestrates server-side composite recording (egress),
//! guaranteeing the target room exists before recording begins.
//!
//! All durable state (room existence, job status) lives in the external
//! media server; the gateway itself is stateless between requests.
//!
//! # Architecture
//!
//! The MG follows the Handler -> Service -> Client pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> clients/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `token` - Access token claims and HS256 signing
//! - `clients` - HTTP clients for the media server API
//! - `services` - Business logic layer
//! - `handlers` - HTTP request handlers
//! - `routes` - Axum router setup
//! - `models` - Request/response models
//! - `observability` - Prometheus metrics

pub mod clients;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
pub mod token;
