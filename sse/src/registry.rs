use crate::connection::{CloseReason, StreamConnection, SubjectId};
use crate::message::Event;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::*;
use std::sync::Arc;

/// Registry of live connections holding at most one connection per subject.
///
/// Every operation on a single subject runs under that subject's DashMap shard lock, so
/// concurrent opens for the same subject serialize while distinct subjects proceed in
/// parallel. Connection I/O never happens while a shard lock is held.
pub struct ConnectionRegistry {
    connections: DashMap<SubjectId, Arc<StreamConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Makes `connection` the subject's live connection.
    ///
    /// Any connection it replaces is closed as `Superseded` and returned. A connection that
    /// closed before it could be registered is not inserted.
    pub fn register(&self, connection: Arc<StreamConnection>) -> Option<Arc<StreamConnection>> {
        let subject_id = connection.subject_id().clone();

        // Checking `is_open` under the shard lock pairs with `close` marking the state before
        // it calls `remove`: either we skip the insert, or its removal runs after we release.
        let displaced = match self.connections.entry(subject_id.clone()) {
            Entry::Occupied(mut entry) => {
                if !connection.is_open() || entry.get().id() == connection.id() {
                    return None;
                }
                Some(entry.insert(Arc::clone(&connection)))
            }
            Entry::Vacant(entry) => {
                if !connection.is_open() {
                    return None;
                }
                entry.insert(Arc::clone(&connection));
                None
            }
        };

        info!(
            "Registered SSE connection {} for user {subject_id}",
            connection.id()
        );

        // The displaced connection no longer holds the slot, so its own removal is a no-op.
        if let Some(previous) = &displaced {
            info!(
                "Superseding SSE connection {} for user {subject_id}",
                previous.id()
            );
            previous.close(CloseReason::Superseded);
        }

        displaced
    }

    /// Removes the subject's entry only if it still holds `connection`.
    pub fn remove(&self, subject_id: &SubjectId, connection: &StreamConnection) -> bool {
        let removed = self
            .connections
            .remove_if(subject_id, |_, current| current.id() == connection.id())
            .is_some();

        if removed {
            debug!(
                "Removed SSE connection {} for user {subject_id}",
                connection.id()
            );
        } else {
            trace!(
                "Skipped removal of stale SSE connection {} for user {subject_id}",
                connection.id()
            );
        }

        removed
    }

    pub fn get(&self, subject_id: &SubjectId) -> Option<Arc<StreamConnection>> {
        self.connections
            .get(subject_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Sends an event to the subject's live connection, returning whether it was written.
    pub fn send(&self, subject_id: &SubjectId, event: Event) -> bool {
        match self.get(subject_id) {
            Some(connection) => connection.send(event),
            None => {
                debug!("No SSE connection for user {subject_id}, dropping event");
                false
            }
        }
    }

    /// Sends an event to every connection present when the call starts.
    ///
    /// Returns the number of connections the event was written to. Connections that close
    /// before their turn are skipped and not counted.
    pub fn broadcast(&self, event: Event) -> usize {
        let delivered = self
            .snapshot()
            .into_iter()
            .filter(|connection| connection.send(event.clone()))
            .count();

        debug!("Broadcast {} event to {delivered} connection(s)", event.name());
        delivered
    }

    /// Closes every live connection with `reason`, returning how many were closed.
    pub fn close_all(&self, reason: CloseReason) -> usize {
        self.snapshot()
            .into_iter()
            .filter(|connection| connection.close(reason))
            .count()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<StreamConnection>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
