use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted when opening a notification stream.
///
/// `EventSource` clients cannot set headers, so the token may travel in the query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct StreamParams {
    /// Bearer token identifying the subject. Takes precedence over an `Authorization` header.
    pub(crate) token: Option<String>,
}
