use crate::application_impl::TokenIssuer;
use crate::application_port::*;
use crate::domain_model::{Identity, TokenPair};
use crate::domain_port::RefreshTokenStore;
use chrono::Utc;
use nanoid::nanoid;
use std::sync::Arc;
use tracing::{debug, info, warn};

const STATE_LEN: usize = 32;

pub struct RealAuthService {
    token_issuer: Arc<TokenIssuer>,
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn RefreshTokenStore>,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl RealAuthService {
    pub fn new(
        token_issuer: Arc<TokenIssuer>,
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn RefreshTokenStore>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            token_issuer,
            token_codec,
            session_store,
            identity_provider,
        }
    }

    #[inline]
    fn new_state() -> String {
        nanoid!(STATE_LEN)
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    fn begin_login(&self) -> Result<LoginRedirect, AuthError> {
        let state = Self::new_state();
        let authorization_url = self.identity_provider.authorization_url(&state)?;
        Ok(LoginRedirect {
            authorization_url,
            state,
        })
    }

    async fn complete_login(&self, code: &str) -> Result<TokenPair, AuthError> {
        if code.is_empty() {
            return Err(AuthError::MissingField("authorization code"));
        }

        let provider_token = self.identity_provider.exchange_code(code).await?;
        let identity = self
            .identity_provider
            .fetch_identity(&provider_token)
            .await?;

        let tokens = self.token_issuer.issue(&identity).await?;
        info!(user = %identity, "login completed");
        Ok(tokens)
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.token_codec.decode_access(token)?;
        Ok(claims.identity())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::MissingField("refresh token"));
        }

        let claims = match self.token_codec.decode_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                // expired or forged: make sure nothing lingers under that key
                if let Err(store_error) = self.session_store.remove(refresh_token).await {
                    warn!("could not drop undecodable refresh token: {}", store_error);
                }
                return Err(e);
            }
        };

        // Rotation: check-and-consume
        let record = self
            .session_store
            .take(refresh_token)
            .await?
            .ok_or(AuthError::TokenRevoked)?;

        if record.is_expired_at(Utc::now()) {
            debug!(subject = %record.subject, "stored refresh token expired");
            return Err(AuthError::TokenExpired);
        }
        if record.subject != claims.sub {
            warn!(claimed = %claims.sub, stored = %record.subject, "refresh token subject mismatch");
            return Err(AuthError::TokenInvalid);
        }

        self.token_issuer.issue(&record.identity).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        if refresh_token.is_empty() {
            return Ok(());
        }
        self.session_store.remove(refresh_token).await
    }
}
