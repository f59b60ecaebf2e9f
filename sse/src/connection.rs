use crate::message::Event;
use crate::registry::ConnectionRegistry;
use log::*;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub use domain::SubjectId;

/// Deadline offset used when `created_at + idle_timeout` is not representable (~30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Sending half of a connection's event channel. The receiving half becomes the response body.
pub type Transport = mpsc::UnboundedSender<Result<Event, TransportError>>;
pub type TransportReceiver = mpsc::UnboundedReceiver<Result<Event, TransportError>>;

/// Creates the channel that carries events from a [`StreamConnection`] to its response body.
pub fn transport() -> (Transport, TransportReceiver) {
    mpsc::unbounded_channel()
}

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client went away.
    Completed,
    /// The idle deadline passed.
    TimedOut,
    /// A write to the transport failed.
    Errored,
    /// A newer connection for the same subject took this one's place.
    Superseded,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CloseReason::Completed => write!(f, "completed"),
            CloseReason::TimedOut => write!(f, "timed out"),
            CloseReason::Errored => write!(f, "errored"),
            CloseReason::Superseded => write!(f, "superseded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed(CloseReason),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }
}

/// Errors carried on, or produced by, a connection's transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The response body was dropped, so nothing is reading the channel anymore.
    Disconnected,
    /// The connection closed as `Errored`; yielding this ends the response body abnormally.
    Aborted,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::Disconnected => write!(f, "stream receiver disconnected"),
            TransportError::Aborted => write!(f, "stream aborted after a transport error"),
        }
    }
}

impl std::error::Error for TransportError {}

/// One live notification stream for a subject.
///
/// The connection starts `Open` and makes exactly one transition to `Closed(reason)` via
/// [`StreamConnection::close`], whichever trigger gets there first. That transition
/// releases the transport and removes the connection from its registry.
pub struct StreamConnection {
    id: ConnectionId,
    subject_id: SubjectId,
    created_at: Instant,
    idle_deadline: Instant,
    state: watch::Sender<ConnectionState>,
    transport: Mutex<Option<Transport>>,
    registry: Weak<ConnectionRegistry>,
}

impl StreamConnection {
    /// Creates an open connection whose idle deadline is `idle_timeout` from now.
    pub fn new(
        subject_id: SubjectId,
        transport: Transport,
        idle_timeout: Duration,
        registry: &Arc<ConnectionRegistry>,
    ) -> Arc<Self> {
        let created_at = Instant::now();
        let (state, _) = watch::channel(ConnectionState::Open);

        Arc::new(Self {
            id: ConnectionId::new(),
            subject_id,
            created_at,
            idle_deadline: created_at
                .checked_add(idle_timeout)
                .unwrap_or_else(|| created_at + FAR_FUTURE),
            state,
            transport: Mutex::new(Some(transport)),
            registry: Arc::downgrade(registry),
        })
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn idle_deadline(&self) -> Instant {
        self.idle_deadline
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Writes an event to the client.
    ///
    /// Returns `false` without side effects if the connection is already closed. A failed
    /// write closes the connection as `Errored` and also returns `false`.
    pub fn send(&self, event: Event) -> bool {
        if !self.is_open() {
            return false;
        }

        let result = match self.lock_transport().as_ref() {
            Some(transport) => transport
                .send(Ok(event))
                .map_err(|_| TransportError::Disconnected),
            None => return false,
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to send event on connection {} for user {}: {e}",
                    self.id, self.subject_id
                );
                self.close(CloseReason::Errored);
                false
            }
        }
    }

    /// Moves the connection to `Closed(reason)`.
    ///
    /// Only the first call transitions; it finalizes the transport, removes this connection
    /// from the registry and returns `true`. Every later call returns `false` and does nothing.
    pub fn close(&self, reason: CloseReason) -> bool {
        let transitioned = self.state.send_if_modified(|state| match state {
            ConnectionState::Open => {
                *state = ConnectionState::Closed(reason);
                true
            }
            ConnectionState::Closed(_) => false,
        });

        if !transitioned {
            trace!(
                "Ignoring close({reason}) for connection {}, already {:?}",
                self.id,
                self.state()
            );
            return false;
        }

        self.finalize_transport(reason);

        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.subject_id, self);
        }

        match reason {
            CloseReason::Errored => error!(
                "SSE connection {} for user {} closed after a transport error",
                self.id, self.subject_id
            ),
            _ => info!(
                "SSE connection {} for user {} {reason}",
                self.id, self.subject_id
            ),
        }

        true
    }

    /// Waits until the connection is closed and returns why.
    pub async fn closed(&self) -> CloseReason {
        let mut state = self.state.subscribe();
        loop {
            let current = *state.borrow_and_update();
            if let ConnectionState::Closed(reason) = current {
                return reason;
            }
            // The sender lives as long as `self`, so this only fails if we are being torn down.
            if state.changed().await.is_err() {
                return CloseReason::Completed;
            }
        }
    }

    /// Spawns the task that closes this connection as `TimedOut` at its idle deadline.
    /// The task exits early if the connection closes for any other reason.
    pub fn spawn_idle_timer(self: &Arc<Self>) -> JoinHandle<()> {
        let connection = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(connection.idle_deadline) => {
                    connection.close(CloseReason::TimedOut);
                }
                _ = connection.closed() => {}
            }
        })
    }

    fn finalize_transport(&self, reason: CloseReason) {
        let Some(transport) = self.lock_transport().take() else {
            return;
        };

        if reason == CloseReason::Errored {
            // Best effort; if the receiver is gone there is nobody left to abort.
            let _ = transport.send(Err(TransportError::Aborted));
        }
        // Dropping the last sender ends the response body gracefully.
    }

    fn lock_transport(&self) -> MutexGuard<'_, Option<Transport>> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StreamConnection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StreamConnection")
            .field("id", &self.id)
            .field("subject_id", &self.subject_id)
            .field("state", &self.state())
            .finish()
    }
}
