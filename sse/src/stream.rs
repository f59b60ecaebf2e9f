use crate::connection::{CloseReason, StreamConnection, TransportError, TransportReceiver};
use async_stream::stream;
use axum::response::sse::Event as SseEvent;
use futures::Stream;
use log::*;
use std::sync::Arc;

/// Turns a connection's receiving channel into an SSE response body.
///
/// The stream ends when the connection releases its transport. If the client goes away
/// first, the body is dropped and the connection is closed as `Completed`.
pub fn event_stream(
    connection: Arc<StreamConnection>,
    mut events: TransportReceiver,
) -> impl Stream<Item = Result<SseEvent, TransportError>> {
    let guard = DisconnectGuard(connection);

    stream! {
        let guard = guard;

        while let Some(event) = events.recv().await {
            yield event.map(SseEvent::from);
        }

        debug!(
            "SSE stream {} for user {} ended: {:?}",
            guard.0.id(),
            guard.0.subject_id(),
            guard.0.state()
        );
    }
}

struct DisconnectGuard(Arc<StreamConnection>);

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.0.close(CloseReason::Completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{transport, ConnectionState};
    use crate::message::Event;
    use crate::registry::ConnectionRegistry;
    use futures::StreamExt;
    use std::time::Duration;

    fn open() -> (
        Arc<ConnectionRegistry>,
        Arc<StreamConnection>,
        TransportReceiver,
    ) {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, rx) = transport();
        let connection =
            StreamConnection::new("u1".to_string(), tx, Duration::from_secs(3600), &registry);
        registry.register(Arc::clone(&connection));
        (registry, connection, rx)
    }

    #[tokio::test]
    async fn test_dropping_body_closes_as_completed() {
        let (registry, connection, rx) = open();
        let stream = event_stream(Arc::clone(&connection), rx);

        drop(stream);

        assert_eq!(
            connection.state(),
            ConnectionState::Closed(CloseReason::Completed)
        );
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_body_ends_when_connection_closes() {
        let (_registry, connection, rx) = open();
        let mut stream = Box::pin(event_stream(Arc::clone(&connection), rx));

        assert!(connection.send(Event::new("ping", "1")));
        assert!(stream.next().await.unwrap().is_ok());

        connection.close(CloseReason::TimedOut);
        assert!(stream.next().await.is_none());
        assert_eq!(
            connection.state(),
            ConnectionState::Closed(CloseReason::TimedOut)
        );
    }

    #[tokio::test]
    async fn test_errored_close_yields_abort() {
        let (_registry, connection, rx) = open();
        let mut stream = Box::pin(event_stream(Arc::clone(&connection), rx));

        connection.close(CloseReason::Errored);

        assert!(matches!(
            stream.next().await,
            Some(Err(TransportError::Aborted))
        ));
        assert!(stream.next().await.is_none());
    }
}
