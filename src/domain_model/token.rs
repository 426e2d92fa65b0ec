use crate::domain_model::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims that declare which kind of token they belong to.
pub trait TypedClaims {
    fn kind(&self) -> TokenKind;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

impl AccessClaims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: identity.id.clone(),
            username: identity.username.clone(),
            avatar_url: identity.avatar_url.clone(),
            name: identity.name.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            kind: TokenKind::Access,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub.clone(),
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            name: self.name.clone(),
        }
    }
}

impl TypedClaims for AccessClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String, // keeps same-second tokens distinct as store keys
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

impl RefreshClaims {
    pub fn new(
        subject: impl Into<String>,
        jti: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: subject.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: jti.into(),
            kind: TokenKind::Refresh,
        }
    }
}

impl TypedClaims for RefreshClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RefreshToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the client receives after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Server-side state kept for every outstanding refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub subject: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(identity: Identity, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject: identity.id.clone(),
            identity,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
