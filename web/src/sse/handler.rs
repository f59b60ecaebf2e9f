use crate::error::Error;
use crate::extractors::bearer_token::BearerToken;
use crate::sse::endpoint::open_stream;
use crate::AppState;
use ::sse::stream::event_stream;
use ::sse::TransportError;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;

/// SSE handler that establishes a long-lived notification stream.
/// One stream per subject; opening another supersedes the previous one.
#[utoipa::path(
    get,
    path = "/api/notifications/events",
    params(crate::params::stream::StreamParams),
    responses(
        (status = 200, description = "Stream opened; the first event is INIT", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Missing or invalid credential"),
        (status = 403, description = "Streaming is disabled for this user"),
        (status = 500, description = "The INIT event could not be written"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn sse_handler(
    State(app_state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Sse<impl Stream<Item = Result<Event, TransportError>>>, Error> {
    let (transport, events) = ::sse::transport();

    let connection = open_stream(&app_state, token.as_deref(), transport).await?;
    debug!("Handing SSE stream {} to the transport layer", connection.id());

    let keep_alive = KeepAlive::new().interval(app_state.config.sse_keep_alive());
    Ok(Sse::new(event_stream(connection, events)).keep_alive(keep_alive))
}
