//! Common test utilities for logflow
//!
//! - Pipeline fixtures wired over in-memory backends
//! - Processing steps and stores with scripted failures

pub mod fixtures;
pub mod steps;

pub use fixtures::{TestPipeline, record, tenant, test_config};
pub use steps::{FlakyStore, ScriptedStep};
