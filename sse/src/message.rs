use axum::response::sse::Event as SseEvent;
use serde::Serialize;

/// Name of the handshake event written first on every new stream.
pub const INIT_EVENT: &str = "INIT";

/// A named event with a string payload, as framed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    data: String,
}

impl Event {
    /// Builds an event. Line breaks are stripped from the name since SSE framing cannot carry them.
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.replace(|c: char| c == '\r' || c == '\n', ""),
            data: data.into(),
        }
    }

    /// The handshake event confirming a stream is open for `subject_id`.
    pub fn init(subject_id: &str) -> Self {
        Self::new(
            INIT_EVENT,
            format!("Connection established for user: {subject_id}"),
        )
    }

    /// Builds an event whose payload is `payload` serialized as JSON.
    pub fn json<T: Serialize>(
        name: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(name, serde_json::to_string(payload)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

impl From<Event> for SseEvent {
    fn from(event: Event) -> Self {
        SseEvent::default().event(event.name).data(event.data)
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub scope: MessageScope,
}

#[derive(Debug, Clone)]
pub enum MessageScope {
    /// Send to the live connection of a specific subject
    User { user_id: String },
    /// Send to all connected subjects
    Broadcast,
}
