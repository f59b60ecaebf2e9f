use crate::params::stream::StreamParams;
use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::convert::Infallible;

/// The credential presented with a request, if any.
///
/// Looks at the `token` query parameter first and falls back to an
/// `Authorization: Bearer <token>` header. Never rejects; an absent token is
/// left for the auth gate to refuse.
pub(crate) struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<StreamParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.token);

        Ok(BearerToken(from_query.or_else(|| bearer_from_header(parts))))
    }
}

fn bearer_from_header(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim().to_string())
}
