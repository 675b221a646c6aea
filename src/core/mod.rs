//! Core functionality for the pipeline
//!
//! Leaf-first: data models, the normalizer, the processing step, batch
//! processing and the worker pool that drives it.

pub mod batch;
pub mod models;
pub mod normalizer;
pub mod processing;
pub mod worker;
