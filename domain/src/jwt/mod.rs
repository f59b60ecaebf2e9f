//! Bearer token validation for notification stream clients.
//!
//! The [`AuthGate`] trait is the boundary the web layer depends on; [`JwtAuthGate`] is the
//! HS256 implementation backed by the secret from [`Config`]. Every failure collapses to
//! [`AuthErrorKind::Missing`] or [`AuthErrorKind::Invalid`] and callers respond to both
//! the same way.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::jwt::{AuthGate, JwtAuthGate};
//!
//! let gate = JwtAuthGate::from_config(&config)?;
//! let subject_id = gate.validate(Some(token))?;
//! ```

use crate::error::{AuthErrorKind, Error};
use crate::SubjectId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::*;
use service::config::Config;

pub use claims::SubjectClaims;

pub(crate) mod claims;

/// Validates a bearer credential and extracts the subject it was issued to.
pub trait AuthGate: Send + Sync {
    fn validate(&self, token: Option<&str>) -> Result<SubjectId, Error>;
}

pub struct JwtAuthGate {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthGate {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config
            .jwt_secret()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| {
                warn!("Failed to get jwt secret from config");
                Error::config("JWT_SECRET is not configured")
            })?;

        Ok(Self::new(secret.as_bytes()))
    }
}

impl AuthGate for JwtAuthGate {
    fn validate(&self, token: Option<&str>) -> Result<SubjectId, Error> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::auth(AuthErrorKind::Missing))?;

        let token_data = decode::<SubjectClaims>(token, &self.decoding_key, &self.validation)?;

        match token_data.claims.subject() {
            Some(subject) => Ok(subject.to_string()),
            None => {
                debug!("Token verified but carries no subject");
                Err(Error::auth(AuthErrorKind::Invalid))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn token_for(claims: &SubjectClaims, secret: &[u8]) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn auth_kind(result: Result<SubjectId, Error>) -> DomainErrorKind {
        result.unwrap_err().error_kind
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let gate = JwtAuthGate::new(SECRET);
        let token = token_for(&SubjectClaims::new("u1", 300), SECRET);

        assert_eq!(gate.validate(Some(&token)).unwrap(), "u1");
    }

    #[test]
    fn test_missing_or_blank_token_is_missing() {
        let gate = JwtAuthGate::new(SECRET);

        assert_eq!(
            auth_kind(gate.validate(None)),
            DomainErrorKind::Auth(AuthErrorKind::Missing)
        );
        assert_eq!(
            auth_kind(gate.validate(Some("  "))),
            DomainErrorKind::Auth(AuthErrorKind::Missing)
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let gate = JwtAuthGate::new(SECRET);
        let token = token_for(&SubjectClaims::new("u1", 300), b"someone-else");

        assert_eq!(
            auth_kind(gate.validate(Some(&token))),
            DomainErrorKind::Auth(AuthErrorKind::Invalid)
        );
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let gate = JwtAuthGate::new(SECRET);

        assert_eq!(
            auth_kind(gate.validate(Some("not.a.jwt"))),
            DomainErrorKind::Auth(AuthErrorKind::Invalid)
        );
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let gate = JwtAuthGate::new(SECRET);
        let mut claims = SubjectClaims::new("u1", 0);
        claims.exp = jsonwebtoken::get_current_timestamp() - 3600;
        let token = token_for(&claims, SECRET);

        assert_eq!(
            auth_kind(gate.validate(Some(&token))),
            DomainErrorKind::Auth(AuthErrorKind::Invalid)
        );
    }

    #[test]
    fn test_token_without_subject_is_invalid() {
        let gate = JwtAuthGate::new(SECRET);
        let mut claims = SubjectClaims::new("", 300);
        let token = token_for(&claims, SECRET);
        assert_eq!(
            auth_kind(gate.validate(Some(&token))),
            DomainErrorKind::Auth(AuthErrorKind::Invalid)
        );

        claims.sub = None;
        let token = token_for(&claims, SECRET);
        assert_eq!(
            auth_kind(gate.validate(Some(&token))),
            DomainErrorKind::Auth(AuthErrorKind::Invalid)
        );
    }

    #[test]
    fn test_from_config_requires_secret() {
        // An explicit argument takes precedence over any JWT_SECRET in the environment.
        let config = <Config as clap::Parser>::try_parse_from([
            "notification_stream_rs",
            "--jwt-secret",
            "",
        ])
        .unwrap();

        match JwtAuthGate::from_config(&config) {
            Ok(_) => panic!("gate built without a secret"),
            Err(e) => assert_eq!(
                e.error_kind,
                DomainErrorKind::Internal(crate::error::InternalErrorKind::Config)
            ),
        }

        assert!(JwtAuthGate::from_config(&config.set_jwt_secret("s".to_string())).is_ok());
    }
}
