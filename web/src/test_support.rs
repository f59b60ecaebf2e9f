use crate::AppState;
use ::sse::NotificationDispatcher;
use clap::Parser;
use domain::jwt::{JwtAuthGate, SubjectClaims};
use domain::preference::{InMemoryPreferences, Preference};
use jsonwebtoken::{encode, EncodingKey, Header};
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "web-test-secret";

/// State with `u2` opted out of streaming and `u3` explicitly opted in.
pub(crate) fn app_state() -> AppState {
    app_state_with_idle_timeout(Duration::from_secs(3600))
}

pub(crate) fn app_state_with_idle_timeout(idle_timeout: Duration) -> AppState {
    let config = Config::try_parse_from(["notification_stream_rs"])
        .unwrap()
        .set_jwt_secret(SECRET.to_string())
        .set_sse_idle_timeout(idle_timeout);

    let preferences = InMemoryPreferences::with_streaming_disabled(vec!["u2".to_string()]);
    preferences.set(
        "u3".to_string(),
        Preference {
            streaming_enabled: true,
        },
    );

    AppState::new(
        config,
        Arc::new(NotificationDispatcher::new()),
        Arc::new(JwtAuthGate::new(SECRET.as_bytes())),
        Arc::new(preferences),
    )
}

pub(crate) fn token_for(subject: &str) -> String {
    encode(
        &Header::default(),
        &SubjectClaims::new(subject, 300),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}
