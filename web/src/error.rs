use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    AuthErrorKind, DomainErrorKind, Error as DomainError, InternalErrorKind, StreamErrorKind,
};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl Error {
    pub fn kind(&self) -> &DomainErrorKind {
        &self.0.error_kind
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// Stream-open failures are reported by status alone; none of them carry a body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            // Missing and invalid credentials must be indistinguishable to the client.
            DomainErrorKind::Auth(AuthErrorKind::Missing | AuthErrorKind::Invalid) => {
                StatusCode::UNAUTHORIZED.into_response()
            }
            DomainErrorKind::Stream(stream_error_kind) => match stream_error_kind {
                StreamErrorKind::PreferenceDenied => StatusCode::FORBIDDEN.into_response(),
                StreamErrorKind::HandshakeWriteFailure => {
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_and_body(err: DomainError) -> (StatusCode, usize) {
        let response = Error::from(err).into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.len())
    }

    #[tokio::test]
    async fn test_auth_errors_map_to_401_without_body() {
        assert_eq!(
            status_and_body(DomainError::auth(AuthErrorKind::Missing)).await,
            (StatusCode::UNAUTHORIZED, 0)
        );
        assert_eq!(
            status_and_body(DomainError::auth(AuthErrorKind::Invalid)).await,
            (StatusCode::UNAUTHORIZED, 0)
        );
    }

    #[tokio::test]
    async fn test_stream_errors_map_to_403_and_500() {
        assert_eq!(
            status_and_body(DomainError::stream(StreamErrorKind::PreferenceDenied)).await,
            (StatusCode::FORBIDDEN, 0)
        );
        assert_eq!(
            status_and_body(DomainError::stream(StreamErrorKind::HandshakeWriteFailure)).await,
            (StatusCode::INTERNAL_SERVER_ERROR, 0)
        );
    }

    #[tokio::test]
    async fn test_config_error_maps_to_500() {
        assert_eq!(
            status_and_body(DomainError::config("missing secret")).await,
            (StatusCode::INTERNAL_SERVER_ERROR, 0)
        );
    }
}
