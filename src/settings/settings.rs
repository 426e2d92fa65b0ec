use anyhow::{Result, anyhow};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub catalog: Catalog,
    pub http: Http,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub signing_secret: Secret,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub frontend_url: String,
    pub sweep_interval_secs: u64,
    pub store: Store,
    pub provider: Provider,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    pub redis_url: Option<String>,
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct Provider {
    pub backend: String, // "fake" or "github"
    pub client_id: String,
    pub client_secret: Secret,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
    pub timeout_secs: u64,
    pub fake_login: String,
}

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub backend: String, // "memory"
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// A configuration value that must never show up in logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

pub const DEV_SIGNING_SECRET: &str = "dev-secret-change-me";

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "LENSCAT";

/// Flat variable names honoured for compatibility with existing deployments.
const LEGACY_ENV: [(&str, &str); 7] = [
    ("GITHUB_CLIENT_ID", "auth.provider.client_id"),
    ("GITHUB_CLIENT_SECRET", "auth.provider.client_secret"),
    ("GITHUB_REDIRECT_URI", "auth.provider.redirect_uri"),
    ("FRONTEND_URL", "auth.frontend_url"),
    ("JWT_SECRET_KEY", "auth.signing_secret"),
    ("JWT_ACCESS_TOKEN_EXPIRES", "auth.access_ttl_secs"),
    ("JWT_REFRESH_TOKEN_EXPIRES", "auth.refresh_ttl_secs"),
];

fn base_builder() -> Result<ConfigBuilder<DefaultState>> {
    let builder = Config::builder()
        .set_default("http.address", "0.0.0.0:5000")?
        .set_default("log.filter", "info")?
        .set_default("log.format", "text")?
        .set_default("catalog.backend", "memory")?
        .set_default("auth.signing_secret", DEV_SIGNING_SECRET)?
        .set_default("auth.access_ttl_secs", 900)?
        .set_default("auth.refresh_ttl_secs", 604_800)?
        .set_default("auth.frontend_url", "http://localhost:5173")?
        .set_default("auth.sweep_interval_secs", 300)?
        .set_default("auth.store.backend", "memory")?
        .set_default("auth.store.prefix", "lenscat:refresh")?
        .set_default("auth.provider.backend", "github")?
        .set_default("auth.provider.client_id", "")?
        .set_default("auth.provider.client_secret", "")?
        .set_default(
            "auth.provider.redirect_uri",
            "http://localhost:5000/api/auth/callback",
        )?
        .set_default(
            "auth.provider.authorize_url",
            "https://github.com/login/oauth/authorize",
        )?
        .set_default(
            "auth.provider.token_url",
            "https://github.com/login/oauth/access_token",
        )?
        .set_default("auth.provider.user_url", "https://api.github.com/user")?
        .set_default("auth.provider.timeout_secs", 10)?
        .set_default("auth.provider.fake_login", "dev")?;
    Ok(builder)
}

fn finish(
    builder: ConfigBuilder<DefaultState>,
    legacy_env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    for (var, key) in LEGACY_ENV {
        builder = builder.set_override_option(key, legacy_env(var))?;
    }

    let settings: Settings = builder
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

/// Defaults, then the TOML file, then `LENSCAT_*` variables, then the legacy
/// flat variables. An explicit `path` must exist; the default one may not.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let (path, required) = match path {
        Some(path) => (path, true),
        None => (SETTINGS_PATH, false),
    };

    let builder = base_builder()?.add_source(File::with_name(path).required(required));
    finish(builder, |name| std::env::var(name).ok())
}
