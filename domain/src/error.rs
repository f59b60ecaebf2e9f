//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure with `domain::error::Error`
/// as the root type holding a tree of `error_kind` enums. The `source` field holds the
/// original error that caused the domain error, if there was one. `web` uses the
/// `error_kind`s to pick the HTTP status returned to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Auth(AuthErrorKind),
    Stream(StreamErrorKind),
    Internal(InternalErrorKind),
}

/// Credential failures. Both kinds are reported to the client identically.
#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    Missing,
    Invalid,
}

/// Failures while establishing a notification stream.
#[derive(Debug, PartialEq)]
pub enum StreamErrorKind {
    /// The subject's delivery preference explicitly disables streaming.
    PreferenceDenied,
    /// The connection was registered but the INIT event could not be written.
    HandshakeWriteFailure,
}

#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

impl Error {
    pub fn auth(kind: AuthErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Auth(kind),
        }
    }

    pub fn stream(kind: StreamErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Stream(kind),
        }
    }

    pub fn config(message: &str) -> Self {
        Error {
            source: Some(message.into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Any failure to decode or verify a presented token is an invalid credential.
impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Auth(AuthErrorKind::Invalid),
        }
    }
}
