//! Error handling for the pipeline
//!
//! This module defines all error types used throughout the pipeline.

#![allow(missing_docs)]

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{PipelineError, Result};
