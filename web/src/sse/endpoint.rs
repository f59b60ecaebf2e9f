use crate::{error::Error, AppState};
use ::sse::{message::Event, CloseReason, ConnectionState, StreamConnection, Transport};
use domain::error::{Error as DomainError, StreamErrorKind};
use domain::preference::streaming_allowed;
use log::*;
use std::sync::Arc;

/// Opens a notification stream for the holder of `token`.
///
/// Nothing is registered unless the token resolves to a subject whose preference allows
/// streaming. Once registered, the connection supersedes any earlier one for the same
/// subject, gets its idle timer, and receives the INIT handshake. If the handshake cannot
/// be written the connection is closed as `Errored` and never handed back.
pub(crate) async fn open_stream(
    app_state: &AppState,
    token: Option<&str>,
    transport: Transport,
) -> Result<Arc<StreamConnection>, Error> {
    let subject_id = app_state.auth_gate.validate(token).map_err(|e| {
        warn!("SSE connection attempt with invalid or missing token.");
        debug!("Token rejected: {e}");
        e
    })?;

    let preference = app_state.preferences.lookup(&subject_id).await;
    if !streaming_allowed(preference.as_ref()) {
        warn!(
            "SSE connection denied for user: {subject_id}. Streaming is disabled in user preferences."
        );
        return Err(DomainError::stream(StreamErrorKind::PreferenceDenied).into());
    }
    match preference {
        Some(_) => info!("SSE connection allowed for user: {subject_id} by user preferences."),
        None => info!(
            "No user preferences found for user: {subject_id}. Allowing SSE connection by default."
        ),
    }

    let registry = app_state.dispatcher.registry();
    let connection = StreamConnection::new(
        subject_id,
        transport,
        app_state.config.sse_idle_timeout(),
        registry,
    );
    registry.register(Arc::clone(&connection));
    connection.spawn_idle_timer();

    send_init(&connection)?;
    Ok(connection)
}

/// Writes the INIT handshake.
///
/// A connection that a newer open (or its idle deadline) already closed is handed back as is;
/// its body ends without events. Only a failed write on this connection is an error.
fn send_init(connection: &StreamConnection) -> Result<(), Error> {
    let subject_id = connection.subject_id();

    if connection.send(Event::init(subject_id)) {
        info!(
            "SSE connection {} established and INIT event sent for user: {subject_id}",
            connection.id()
        );
        return Ok(());
    }

    match connection.state() {
        ConnectionState::Closed(reason @ (CloseReason::Superseded | CloseReason::TimedOut)) => {
            info!(
                "SSE connection {} for user: {subject_id} was {reason} before its INIT event",
                connection.id()
            );
            Ok(())
        }
        _ => {
            error!("Error sending INIT event to user: {subject_id}");
            connection.close(CloseReason::Errored);
            Err(DomainError::stream(StreamErrorKind::HandshakeWriteFailure).into())
        }
    }
}
