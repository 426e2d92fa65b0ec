use crate::application_port::{AuthError, IdentityProvider, ProviderToken};
use crate::domain_model::Identity;
use url::Url;

const FAKE_CODE_PREFIX: &str = "fake-code:";
const FAKE_TOKEN_PREFIX: &str = "fake-token:";

/// Offline stand-in for the external provider.
///
/// The "authorization" step bounces straight back to our own callback with a
/// code of the form `fake-code:<login>`; any login is accepted.
#[derive(Debug)]
pub struct FakeIdentityProvider {
    redirect_uri: Url,
    login: String,
}

impl FakeIdentityProvider {
    pub fn new(redirect_uri: Url, login: impl Into<String>) -> Self {
        Self {
            redirect_uri,
            login: login.into(),
        }
    }

    pub fn code_for(login: &str) -> String {
        format!("{FAKE_CODE_PREFIX}{login}")
    }
}

// Minimal fake implementation for development and tests.
#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = self.redirect_uri.clone();
        url.query_pairs_mut()
            .append_pair("code", &Self::code_for(&self.login))
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, AuthError> {
        match code.strip_prefix(FAKE_CODE_PREFIX) {
            Some(login) if !login.is_empty() => {
                Ok(ProviderToken(format!("{FAKE_TOKEN_PREFIX}{login}")))
            }
            _ => Err(AuthError::Provider(format!("unknown authorization code: {code}"))),
        }
    }

    async fn fetch_identity(&self, token: &ProviderToken) -> Result<Identity, AuthError> {
        match token.0.strip_prefix(FAKE_TOKEN_PREFIX) {
            Some(login) => Ok(get_fake_identity(login)),
            None => Err(AuthError::Provider("unknown provider token".to_string())),
        }
    }
}

fn get_fake_identity(login: &str) -> Identity {
    let id = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, login.as_bytes());
    Identity::new(id.to_string(), login).with_name(login)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> FakeIdentityProvider {
        let redirect = Url::parse("http://localhost:5000/api/auth/callback").unwrap();
        FakeIdentityProvider::new(redirect, "dev")
    }

    #[test]
    fn authorization_url_points_back_at_the_callback() {
        let url = provider().authorization_url("s1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/auth/callback?code=fake-code%3Adev&state=s1"
        );
    }

    #[tokio::test]
    async fn code_resolves_to_a_stable_identity() {
        let provider = provider();
        let token = provider.exchange_code("fake-code:alice").await.unwrap();
        let first = provider.fetch_identity(&token).await.unwrap();
        let second = provider.fetch_identity(&token).await.unwrap();

        assert_eq!(first.username, "alice");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn foreign_codes_are_rejected() {
        assert!(matches!(
            provider().exchange_code("gh-real-code").await,
            Err(AuthError::Provider(_))
        ));
        assert!(matches!(
            provider().exchange_code("fake-code:").await,
            Err(AuthError::Provider(_))
        ));
    }
}
