//! # API Shared
//!
//! Shared definitions for the vstore APIs.
//!
//! Contains:
//! - Request and response types (`dto` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `vstore-run` binary.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
