//! Session Service
//!
//! Signed HS256 session tokens carried in an HTTP-only cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConsoleError, Result};

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username the session was opened for
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret_key: String,
    pub cookie_name: String,
    pub secure: bool,
    /// `Strict`, `Lax` or `None`
    pub same_site: String,
    pub expiry_secs: i64,
    pub issuer: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            cookie_name: "hrm_session".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
            expiry_secs: 28800, // 8 hours
            issuer: "hrm-console".to_string(),
        }
    }
}

pub struct SessionService {
    settings: SessionSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionService {
    pub fn new(settings: SessionSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret_key.as_bytes());

        info!(
            cookie = %settings.cookie_name,
            expiry_secs = settings.expiry_secs,
            "SessionService initialized with HS256"
        );

        Self {
            settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.settings.cookie_name
    }

    /// Sign a session token for `username`.
    pub fn issue(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: username.to_string(),
            iss: self.settings.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.settings.expiry_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ConsoleError::internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify signature, issuer and expiry.
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.settings.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected session token");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        ConsoleError::unauthorized("Session expired")
                    }
                    _ => ConsoleError::unauthorized(format!("Invalid session: {}", e)),
                }
            })
    }

    /// Cookie carrying a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let same_site = match self.settings.same_site.to_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        };

        Cookie::build((self.settings.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.settings.secure)
            .same_site(same_site)
            .max_age(time::Duration::seconds(self.settings.expiry_secs))
            .build()
    }

    /// Cookie that overwrites the session and expires immediately.
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.settings.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new(SessionSettings {
            secret_key: "test-secret".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let sessions = service();
        let token = sessions.issue("admin@example.com").unwrap();
        let claims = sessions.validate(&token).unwrap();

        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.iss, "hrm-console");
        assert_eq!(claims.exp - claims.iat, 28800);
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = service().issue("admin@example.com").unwrap();
        let other = SessionService::new(SessionSettings {
            secret_key: "another-secret".to_string(),
            ..Default::default()
        });

        assert!(matches!(
            other.validate(&token),
            Err(ConsoleError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let sessions = SessionService::new(SessionSettings {
            secret_key: "test-secret".to_string(),
            expiry_secs: -3600,
            ..Default::default()
        });
        let token = sessions.issue("admin@example.com").unwrap();

        let err = sessions.validate(&token).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Session expired");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(service().validate("not-a-token").is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let sessions = service();
        let cookie = sessions.session_cookie("tok".to_string());

        assert_eq!(cookie.name(), "hrm_session");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));

        let cleared = sessions.cleared_cookie();
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
    }
}
