//! REST-shaped boundary over `devlab_core`.
//!
//! # Responsibility
//! - Parse JSON request bodies into typed core payloads.
//! - Resolve the caller's user id into an actor before each use-case call.
//! - Render results and failures as `(status, JSON body)` envelopes.
//!
//! # Invariants
//! - Handlers never panic; every failure becomes an `ApiResponse`.
//! - Error bodies are field-keyed objects.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod response;
pub mod views;

pub use config::ApiConfig;
pub use response::ApiResponse;

/// Health-check passthrough for smoke checks.
pub fn ping() -> &'static str {
    devlab_core::ping()
}

/// Core crate version as seen through the boundary.
pub fn core_version() -> &'static str {
    devlab_core::core_version()
}
