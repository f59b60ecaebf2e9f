//! SSE HTTP layer for notification streams.
//!
//! `endpoint` runs the stream-open protocol (auth, preference, register, handshake) and
//! `handler` adapts it to Axum. The connection lifecycle itself lives in the `sse` crate.

pub(crate) mod endpoint;
pub mod handler;
