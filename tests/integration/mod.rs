//! Integration tests for logflow
//!
//! These tests drive real components over the in-memory backends.

pub mod config_tests;
pub mod dead_letter_tests;
pub mod error_handling_tests;
pub mod idempotence_tests;
pub mod ingest_flow_tests;
pub mod partial_failure_tests;
pub mod tenant_isolation_tests;
