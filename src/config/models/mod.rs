//! Configuration data models
//!
//! This module defines all configuration structures used throughout the pipeline.

#![allow(missing_docs)]

pub mod buffer;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod processing;
pub mod server;
pub mod store;
pub mod worker;

pub use buffer::*;
pub use ingest::*;
pub use logging::*;
pub use pipeline::*;
pub use processing::*;
pub use server::*;
pub use store::*;
pub use worker::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8080
}

/// Default client request timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    256 * 1024 // 256KB
}

pub fn default_true() -> bool {
    true
}
