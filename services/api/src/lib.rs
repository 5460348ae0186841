//! Learning Path API Library Crate
//!
//! The web surface over the pipeline: application state, REST handlers, the
//! progress WebSocket and routing. The binaries are thin wrappers around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
