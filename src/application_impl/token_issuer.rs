use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::*;
use crate::domain_port::RefreshTokenStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Mints access/refresh pairs and registers every refresh token it hands out.
pub struct TokenIssuer {
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn RefreshTokenStore>,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn RefreshTokenStore>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            token_codec,
            session_store,
            lifetimes,
        }
    }

    pub async fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        self.issue_at(identity, Utc::now()).await
    }

    /// Same as [`TokenIssuer::issue`] with `now` as the issue time.
    pub async fn issue_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access_exp = now + to_chrono(self.lifetimes.access_ttl)?;
        let refresh_exp = now + to_chrono(self.lifetimes.refresh_ttl)?;

        let access_claims = AccessClaims::new(identity, now, access_exp);
        let access_token = self.token_codec.encode_access(&access_claims)?;

        let refresh_claims = RefreshClaims::new(&identity.id, new_jti(), now, refresh_exp);
        let refresh_token = self.token_codec.encode_refresh(&refresh_claims)?;

        self.session_store
            .put(
                refresh_token.as_str(),
                RefreshTokenRecord::new(identity.clone(), refresh_exp),
            )
            .await?;

        debug!(subject = %identity.id, %refresh_exp, "issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: BEARER,
            expires_in: self.lifetimes.access_ttl.as_secs(),
        })
    }
}

#[inline]
fn new_jti() -> String {
    Uuid::new_v4().to_string()
}

fn to_chrono(ttl: Duration) -> Result<chrono::Duration, AuthError> {
    chrono::Duration::from_std(ttl).map_err(|e| AuthError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::JwtHs256Codec;
    use crate::infra_memory::MemoryRefreshTokenStore;

    fn issuer() -> (TokenIssuer, Arc<JwtHs256Codec>, Arc<MemoryRefreshTokenStore>) {
        let codec = Arc::new(JwtHs256Codec::new(b"issuer-test-secret"));
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let issuer = TokenIssuer::new(codec.clone(), store.clone(), TokenLifetimes::default());
        (issuer, codec, store)
    }

    #[tokio::test]
    async fn issued_access_token_decodes_back_to_the_identity() {
        let (issuer, codec, _) = issuer();
        let identity = Identity::new("42", "alice")
            .with_name("Alice")
            .with_avatar_url("https://avatars.example/42");

        let pair = issuer.issue(&identity).await.unwrap();
        let claims = codec.decode_access(pair.access_token.as_str()).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.name.as_deref(), Some("Alice"));
        assert_eq!(claims.avatar_url.as_deref(), Some("https://avatars.example/42"));
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
    }

    #[tokio::test]
    async fn each_issue_registers_exactly_one_refresh_token() {
        let (issuer, codec, store) = issuer();
        let identity = Identity::new("42", "alice");

        let first = issuer.issue(&identity).await.unwrap();
        let second = issuer.issue(&identity).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert!(store.contains(first.refresh_token.as_str()));

        let claims = codec.decode_refresh(second.refresh_token.as_str()).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn stored_record_snapshots_identity_and_expiry() {
        let (issuer, _, store) = issuer();
        let identity = Identity::new("7", "bob").with_name("Bob");
        let now = Utc::now();

        let pair = issuer.issue_at(&identity, now).await.unwrap();
        let record = store.take(pair.refresh_token.as_str()).await.unwrap().unwrap();

        assert_eq!(record.identity, identity);
        assert_eq!(record.subject, "7");
        assert_eq!(record.expires_at, now + chrono::Duration::days(7));
    }
}
