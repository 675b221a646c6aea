//! HTTP ingress gateway
//!
//! Accepts log events, normalizes them and hands them to the buffer. The
//! gateway never processes records and never touches the record store.

pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
