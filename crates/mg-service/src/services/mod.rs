//! Business logic layer.
//!
//! - `token_service` - credential issuance (no external calls)
//! - `room_service` - idempotent room existence guarantee
//! - `egress_service` - recording lifecycle orchestration

pub mod egress_service;
pub mod room_service;
pub mod token_service;
