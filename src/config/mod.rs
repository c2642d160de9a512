//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, byte caps, header checklists)
//! - The `AuditConfig` struct threaded into every pipeline component
//! - CLI option enums

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{AuditConfig, LogFormat, LogLevel};
