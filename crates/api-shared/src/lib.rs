//! # API Shared
//!
//! Shared definitions for the passômetro APIs.
//!
//! Contains:
//! - Request and response bodies (`dto` module), documented for OpenAPI
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the workspace's main binary.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::{HealthRes, HealthService};
