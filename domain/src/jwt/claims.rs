//! Claims carried by the bearer tokens that stream clients present.
//!
//! Tokens are issued elsewhere (the login service); this crate only decodes them.
//! `sub` is optional in the decoded form so that a structurally valid token without
//! a subject is rejected by the auth gate rather than by serde.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SubjectClaims {
    /// Claims for `sub` that expire `ttl_secs` from now.
    pub fn new(sub: impl Into<String>, ttl_secs: u64) -> Self {
        let now = jsonwebtoken::get_current_timestamp();
        Self {
            sub: Some(sub.into()),
            exp: now + ttl_secs,
            iat: now,
            roles: Vec::new(),
        }
    }

    /// Returns the subject if it is present and non-blank.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|sub| !sub.trim().is_empty())
    }
}
