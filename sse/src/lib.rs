//! Server-Sent Events (SSE) infrastructure for real-time notifications.
//!
//! This crate owns the lifecycle of notification streams: the per-subject connection
//! registry, the state machine each connection runs through, and the dispatcher the
//! rest of the system uses to push events.
//!
//! # Architecture
//!
//! - **Single connection per subject**: registering a new connection for a subject
//!   closes the previous one as `Superseded`. The registry never holds more than one
//!   entry per subject, even under concurrent opens.
//! - **One terminal transition**: a connection is `Open` until the first of client
//!   disconnect, idle timeout, write failure or supersession calls
//!   [`StreamConnection::close`]. Later triggers are no-ops.
//! - **Explicit transport ownership**: the sending half of a connection's channel is
//!   released exactly once, by that first close.
//! - **Ephemeral messages**: if a subject is offline the event is dropped; nothing is
//!   queued or retried.
//! - **Snapshot broadcasts**: broadcasts copy the registry before writing so no lock is
//!   held across per-connection I/O.
//!
//! # Example: Sending an event
//!
//! ```rust,ignore
//! // In another subsystem holding the shared dispatcher
//! let delivered = app_state.dispatcher.send(&subject_id, "order_shipped", payload);
//! let reached = app_state.dispatcher.broadcast("maintenance", "starting in 5 minutes");
//! ```
//!
//! # Modules
//!
//! - `connection`: StreamConnection state machine, close reasons and transport channel
//! - `registry`: ConnectionRegistry keyed by subject
//! - `dispatcher`: NotificationDispatcher, the external send/broadcast surface
//! - `message`: wire-level events and routing scopes
//! - `stream`: adapts a connection's channel into a response body

pub mod connection;
pub mod dispatcher;
pub mod message;
pub mod registry;
pub mod stream;

pub use connection::{
    transport, CloseReason, ConnectionId, ConnectionState, StreamConnection, SubjectId,
    Transport, TransportError, TransportReceiver,
};
pub use dispatcher::NotificationDispatcher;
pub use registry::ConnectionRegistry;
