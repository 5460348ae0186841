//! WebSocket Progress Streaming
//!
//! A client opens `/ws`, sends a `start` message with a topic, and receives
//! every progress event of the run followed by the plan or the failure.
//!
//! - `protocol`: the JSON message format in both directions.
//! - `session`: connection lifecycle, run execution and cancellation.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
