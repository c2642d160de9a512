//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the process-wide resources:
//! - The HTTP client used by the content fetcher
//! - The logger

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
