use crate::domain_model::TokenPair;
use anyhow::{Result, anyhow};
use url::Url;

pub const STATE_COOKIE: &str = "oauth_state";
const STATE_COOKIE_MAX_AGE_SECS: u64 = 600;

/// Where the browser lands after the provider callback.
#[derive(Debug, Clone)]
pub struct Frontend {
    base: String,
}

impl Frontend {
    pub fn try_new(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).map_err(|e| anyhow!("invalid frontend url {base_url:?}: {e}"))?;
        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Tokens ride in the fragment so they never reach a server log.
    pub fn login_succeeded(&self, tokens: &TokenPair) -> Result<String> {
        let expires_in = tokens.expires_in.to_string();
        let fragment = serde_urlencoded::to_string([
            ("access_token", tokens.access_token.as_str()),
            ("refresh_token", tokens.refresh_token.as_str()),
            ("token_type", tokens.token_type),
            ("expires_in", expires_in.as_str()),
        ])?;
        Ok(format!("{}/login/callback#{}", self.base, fragment))
    }

    pub fn login_failed(&self) -> String {
        format!("{}/login?error=oauth_failed", self.base)
    }
}

pub fn state_cookie(state: &str) -> String {
    format!(
        "{STATE_COOKIE}={state}; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_MAX_AGE_SECS}; Path=/"
    )
}

pub fn clear_state_cookie() -> String {
    format!("{STATE_COOKIE}=; HttpOnly; SameSite=Lax; Max-Age=0; Path=/")
}
