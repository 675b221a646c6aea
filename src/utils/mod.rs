//! Utility modules for the pipeline

pub mod error; // Error handling
pub mod logging; // Logging setup
