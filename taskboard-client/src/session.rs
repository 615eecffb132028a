/// Client-side view of the current login
///
/// A [`Session`] is created once at start-up from a [`TokenStore`] and passed
/// explicitly to whatever needs the identity. It decodes the token payload
/// for display and gating only; the signature is never checked here, the
/// server does that on every request.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

use crate::token_store::{TokenStore, TokenStoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token is not a JWT")]
    Malformed,

    #[error("token payload is not valid base64url")]
    Encoding(#[from] base64::DecodeError),

    #[error("token payload is not valid claims JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// Reads the claims out of a JWT without verifying it
pub fn decode_claims(token: &str) -> Result<SessionClaims, SessionError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(SessionError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub struct Session<S: TokenStore> {
    store: S,
    current: Option<(String, SessionClaims)>,
}

impl<S: TokenStore> Session<S> {
    /// Restores the session persisted in `store`
    ///
    /// A stored token that cannot be decoded is removed from the store.
    /// An expired one is kept, so `whoami` can still say who it belonged to.
    pub fn load(store: S) -> Result<Self, SessionError> {
        let current = match store.load()? {
            Some(token) => match decode_claims(&token) {
                Ok(claims) => Some((token, claims)),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable stored token");
                    store.clear()?;
                    None
                }
            },
            None => None,
        };

        Ok(Self { store, current })
    }

    /// Present and not yet expired
    pub fn is_authenticated(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(_, claims)| !claims.is_expired())
    }

    /// Token to send, if the session is authenticated
    pub fn token(&self) -> Option<&str> {
        self.authenticated().map(|(token, _)| token.as_str())
    }

    /// Decoded claims, expired or not
    pub fn claims(&self) -> Option<&SessionClaims> {
        self.current.as_ref().map(|(_, claims)| claims)
    }

    pub fn role(&self) -> Option<Role> {
        self.authenticated().map(|(_, claims)| claims.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.authenticated().map(|(_, claims)| claims.sub)
    }

    /// Adopts a freshly issued token and persists it
    pub fn login(&mut self, token: String) -> Result<&SessionClaims, SessionError> {
        let claims = decode_claims(&token)?;
        self.store.save(&token)?;

        let (_, claims) = &*self.current.insert((token, claims));
        Ok(claims)
    }

    /// Forgets the token, in memory and in the store
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.store.clear()?;
        Ok(())
    }

    fn authenticated(&self) -> Option<&(String, SessionClaims)> {
        self.current
            .as_ref()
            .filter(|(_, claims)| !claims.is_expired())
    }
}
