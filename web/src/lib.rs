//! HTTP surface of the notification stream service.
//!
//! Exposes the stream-open endpoint, a health check and the OpenAPI docs, and owns
//! the application state shared by every handler.

use ::sse::{CloseReason, NotificationDispatcher};
use domain::error::Error as DomainError;
use domain::jwt::{AuthGate, JwtAuthGate};
use domain::preference::{InMemoryPreferences, PreferenceLookup};
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

mod controller;
pub mod error;
mod extractors;
mod params;
pub mod router;
mod sse;

#[cfg(test)]
mod test_support;

// Application state shared by all handlers.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub auth_gate: Arc<dyn AuthGate>,
    pub preferences: Arc<dyn PreferenceLookup>,
}

impl AppState {
    pub fn new(
        config: Config,
        dispatcher: Arc<NotificationDispatcher>,
        auth_gate: Arc<dyn AuthGate>,
        preferences: Arc<dyn PreferenceLookup>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            auth_gate,
            preferences,
        }
    }

    /// Builds the production state: a JWT gate from the configured secret and an
    /// in-memory preference store seeded with the configured disabled subjects.
    pub fn from_config(config: Config) -> Result<Self, DomainError> {
        let auth_gate = JwtAuthGate::from_config(&config)?;
        let preferences = InMemoryPreferences::with_streaming_disabled(
            config.streaming_disabled_subjects.clone(),
        );

        Ok(Self::new(
            config,
            Arc::new(NotificationDispatcher::new()),
            Arc::new(auth_gate),
            Arc::new(preferences),
        ))
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{host}:{}", app_state.config.port);
    let dispatcher = Arc::clone(&app_state.dispatcher);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(listener, router::define_routes(app_state))
        .with_graceful_shutdown(shutdown_signal(dispatcher))
        .await
}

/// Waits for SIGINT/SIGTERM, then completes every open stream so the server can drain.
async fn shutdown_signal(dispatcher: Arc<NotificationDispatcher>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    let closed = dispatcher.registry().close_all(CloseReason::Completed);
    info!("Shutdown signal received, completed {closed} SSE connection(s)");
}
