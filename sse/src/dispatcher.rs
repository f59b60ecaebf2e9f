use crate::connection::SubjectId;
use crate::message::{Event, Message, MessageScope};
use crate::registry::ConnectionRegistry;
use log::*;
use std::sync::Arc;

/// Entry point the rest of the system uses to push notifications to connected subjects.
///
/// Delivery is best-effort and happens synchronously in the call; nothing is queued
/// or retried for subjects that are offline.
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ConnectionRegistry::new()))
    }

    pub fn with_registry(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// The registry stream endpoints register their connections with.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Sends a named event to one subject, returning whether it was written.
    pub fn send(
        &self,
        subject_id: &SubjectId,
        event_name: impl Into<String>,
        payload: impl Into<String>,
    ) -> bool {
        self.registry.send(subject_id, Event::new(event_name, payload))
    }

    /// Sends a named event to every connected subject, returning the delivered count.
    pub fn broadcast(&self, event_name: impl Into<String>, payload: impl Into<String>) -> usize {
        self.registry.broadcast(Event::new(event_name, payload))
    }

    /// Routes a message based on its scope and returns the number of connections reached.
    pub fn send_message(&self, message: Message) -> usize {
        debug!("Dispatching {} event to {:?}", message.event.name(), message.scope);

        match message.scope {
            MessageScope::User { user_id } => {
                usize::from(self.registry.send(&user_id, message.event))
            }
            MessageScope::Broadcast => self.registry.broadcast(message.event),
        }
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{transport, StreamConnection};
    use serde_json::json;
    use std::time::Duration;

    fn connect(dispatcher: &NotificationDispatcher, subject: &str) -> crate::TransportReceiver {
        let (tx, rx) = transport();
        let connection = StreamConnection::new(
            subject.to_string(),
            tx,
            Duration::from_secs(3600),
            dispatcher.registry(),
        );
        dispatcher.registry().register(connection);
        rx
    }

    #[tokio::test]
    async fn test_send_to_connected_and_offline_subjects() {
        let dispatcher = NotificationDispatcher::new();
        let mut rx = connect(&dispatcher, "u1");

        assert!(dispatcher.send(&"u1".to_string(), "reminder", "stand-up in 5"));
        assert!(!dispatcher.send(&"offline".to_string(), "reminder", "stand-up in 5"));

        let event = rx.recv().await.unwrap().unwrap();
        assert_eq!(event.name(), "reminder");
        assert_eq!(event.data(), "stand-up in 5");
    }

    #[tokio::test]
    async fn test_broadcast_returns_delivered_count() {
        let dispatcher = NotificationDispatcher::new();
        let _u1 = connect(&dispatcher, "u1");
        let _u2 = connect(&dispatcher, "u2");

        assert_eq!(dispatcher.broadcast("maintenance", "tonight"), 2);
    }

    #[tokio::test]
    async fn test_send_message_routes_by_scope() {
        let dispatcher = NotificationDispatcher::new();
        let mut u1 = connect(&dispatcher, "u1");
        let _u2 = connect(&dispatcher, "u2");
        let event = Event::json("order_shipped", &json!({"order_id": 7})).unwrap();

        let reached = dispatcher.send_message(Message {
            event: event.clone(),
            scope: MessageScope::User {
                user_id: "u1".to_string(),
            },
        });
        assert_eq!(reached, 1);
        assert_eq!(u1.recv().await.unwrap().unwrap(), event);

        let reached = dispatcher.send_message(Message {
            event,
            scope: MessageScope::Broadcast,
        });
        assert_eq!(reached, 2);
    }
}
