//! GitHub as the external identity provider.
//!
//! Authorization-code grant: the browser is sent to the authorize endpoint,
//! the returned code is exchanged at the token endpoint, and the resulting
//! provider token is used once to read the user profile.

use crate::application_port::{AuthError, IdentityProvider, ProviderToken};
use crate::domain_model::Identity;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_USER_URL: &str = "https://api.github.com/user";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
    pub scope: String,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            user_url: GITHUB_USER_URL.to_string(),
            scope: "read:user".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Token endpoint reply. GitHub answers 200 with an `error` field when the
/// code is bad or already used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
}

impl From<GitHubUser> for Identity {
    fn from(user: GitHubUser) -> Self {
        Identity {
            id: user.id.to_string(),
            username: user.login,
            avatar_url: user.avatar_url,
            name: user.name,
        }
    }
}

pub struct GitHubIdentityProvider {
    http_client: Client,
    config: GitHubConfig,
}

impl GitHubIdentityProvider {
    pub fn try_new(config: GitHubConfig) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AuthError::InternalError(format!("http client: {e}")))?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GitHubIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.config.authorize_url)
            .map_err(|e| AuthError::InternalError(format!("invalid authorize url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!(
                "token exchange failed: HTTP {status} - {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("failed to parse token response: {e}")))?;

        match (token.access_token, token.error) {
            (_, Some(error)) => {
                let description = token.error_description.unwrap_or_default();
                Err(AuthError::Provider(format!(
                    "token exchange rejected: {error} - {description}"
                )))
            }
            (Some(access_token), None) => {
                debug!("exchanged authorization code");
                Ok(ProviderToken(access_token))
            }
            (None, None) => Err(AuthError::Provider(
                "token response carried no access_token".to_string(),
            )),
        }
    }

    async fn fetch_identity(&self, token: &ProviderToken) -> Result<Identity, AuthError> {
        let response = self
            .http_client
            .get(&self.config.user_url)
            .bearer_auth(&token.0)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("user request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!(
                "user fetch failed: HTTP {status} - {body}"
            )));
        }

        let user: GitHubUser = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("failed to parse user response: {e}")))?;

        info!(login = %user.login, id = user.id, "resolved github identity");
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GitHubIdentityProvider {
        let base = server.uri();
        let mut config = GitHubConfig::new(
            "client-123",
            "shh",
            "http://localhost:5000/api/auth/callback",
        );
        config.authorize_url = format!("{base}/login/oauth/authorize");
        config.token_url = format!("{base}/login/oauth/access_token");
        config.user_url = format!("{base}/user");
        config.timeout = Duration::from_secs(2);
        GitHubIdentityProvider::try_new(config).unwrap()
    }

    #[test]
    fn authorization_url_carries_client_scope_and_state() {
        let provider = GitHubIdentityProvider::try_new(GitHubConfig::new(
            "client-123",
            "shh",
            "http://localhost:5000/api/auth/callback",
        ))
        .unwrap();

        let url = provider.authorization_url("xyz").unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with(GITHUB_AUTHORIZE_URL));
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["redirect_uri"], "http://localhost:5000/api/auth/callback");
        assert_eq!(pairs["scope"], "read:user");
        assert_eq!(pairs["state"], "xyz");
        assert_eq!(pairs["response_type"], "code");
        assert!(!pairs.contains_key("client_secret"));
    }

    #[tokio::test]
    async fn exchange_code_posts_credentials_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(header("accept", "application/json"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("client_secret=shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_token",
                "token_type": "bearer",
                "scope": "read:user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = provider_for(&server).exchange_code("abc").await.unwrap();
        assert_eq!(token.0, "gho_token");
    }

    #[tokio::test]
    async fn exchange_code_treats_error_body_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).exchange_code("stale").await.unwrap_err();
        match err {
            AuthError::Provider(msg) => assert!(msg.contains("bad_verification_code")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exchange_code_reports_http_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(matches!(
            provider_for(&server).exchange_code("abc").await,
            Err(AuthError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn fetch_identity_maps_the_github_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "login": "alice",
                "name": null,
                "avatar_url": "https://avatars.githubusercontent.com/u/42",
                "public_repos": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = provider_for(&server)
            .fetch_identity(&ProviderToken("gho_token".to_string()))
            .await
            .unwrap();

        assert_eq!(
            identity,
            Identity::new("42", "alice")
                .with_avatar_url("https://avatars.githubusercontent.com/u/42")
        );
    }

    #[tokio::test]
    async fn fetch_identity_reports_rejected_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch_identity(&ProviderToken("revoked".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Provider(msg) if msg.contains("401")));
    }
}
