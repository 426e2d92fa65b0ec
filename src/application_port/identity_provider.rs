use crate::application_port::AuthError;
use crate::domain_model::Identity;
use std::fmt;
use url::Url;

/// Access token handed out by the external provider. Only used to fetch the
/// user profile, never forwarded to clients.
#[derive(Clone)]
pub struct ProviderToken(pub String);

impl fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderToken(***)")
    }
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> Result<Url, AuthError>;
    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, AuthError>;
    async fn fetch_identity(&self, token: &ProviderToken) -> Result<Identity, AuthError>;
}
