//! Domain rules for the notification stream service: who a bearer token belongs to
//! and whether that subject may open a stream.

pub mod error;
pub mod jwt;
pub mod preference;

/// Opaque identity of an authenticated subject, taken from a token's `sub` claim.
pub type SubjectId = String;
