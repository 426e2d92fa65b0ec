use crate::domain_model::{AccessClaims, AccessToken, Identity, RefreshClaims, RefreshToken, TokenPair};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("missing or invalid authorization header")]
    MissingCredentials,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("refresh token not found or revoked")]
    TokenRevoked,
    #[error("oauth state mismatch")]
    StateMismatch,
    #[error("provider error: {0}")]
    Provider(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub authorization_url: Url,
    pub state: String,
}

/// Signs and verifies first-party tokens.
///
/// Decoding checks the signature, the expiry and the `type` claim; a token of
/// the wrong kind is rejected even when its signature is valid.
pub trait TokenCodec: Send + Sync {
    fn encode_access(&self, claims: &AccessClaims) -> Result<AccessToken, AuthError>;
    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<RefreshToken, AuthError>;
    fn decode_access(&self, token: &str) -> Result<AccessClaims, AuthError>;
    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Start the provider handshake. The returned state must round-trip
    /// through the client and come back on the callback.
    fn begin_login(&self) -> Result<LoginRedirect, AuthError>;
    async fn complete_login(&self, code: &str) -> Result<TokenPair, AuthError>;
    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError>;
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;
}
