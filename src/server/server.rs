use crate::api::Frontend;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_github::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{DEV_SIGNING_SECRET, Settings};
use anyhow::anyhow;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub frontend: Arc<Frontend>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    /// A server over ready-made services, with no background tasks.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        catalog_service: Arc<dyn CatalogService>,
        frontend: Frontend,
    ) -> Self {
        Self {
            auth_service,
            catalog_service,
            frontend: Arc::new(frontend),
            sweeper_handle: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let auth = &settings.auth;

        let secret = auth.signing_secret.expose();
        if secret.is_empty() {
            return Err(anyhow!("auth.signing_secret must not be empty"));
        }
        if secret == DEV_SIGNING_SECRET {
            warn!("using the built-in development signing secret; set auth.signing_secret");
        }
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(secret.as_bytes()));

        let session_store: Arc<dyn RefreshTokenStore> = match auth.store.backend.as_str() {
            "memory" => Arc::new(MemoryRefreshTokenStore::new()),
            "redis" => {
                let redis_url = auth
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("auth.store.redis_url is required for the redis store"))?;
                let redis_client = redis::Client::open(redis_url)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisRefreshTokenStore::new(
                    redis_manager,
                    auth.store.prefix.clone(),
                ))
            }
            other => return Err(anyhow!("Unknown refresh token store backend: {}", other)),
        };

        let provider = &auth.provider;
        let identity_provider: Arc<dyn IdentityProvider> = match provider.backend.as_str() {
            "fake" => {
                warn!("using the fake identity provider; every login succeeds");
                Arc::new(FakeIdentityProvider::new(
                    Url::parse(&provider.redirect_uri)?,
                    provider.fake_login.clone(),
                ))
            }
            "github" => {
                if provider.client_id.is_empty() {
                    warn!("auth.provider.client_id is empty; GitHub logins will fail");
                }
                let mut config = GitHubConfig::new(
                    provider.client_id.clone(),
                    provider.client_secret.expose(),
                    provider.redirect_uri.clone(),
                );
                config.authorize_url = provider.authorize_url.clone();
                config.token_url = provider.token_url.clone();
                config.user_url = provider.user_url.clone();
                config.timeout = Duration::from_secs(provider.timeout_secs);
                Arc::new(GitHubIdentityProvider::try_new(config)?)
            }
            other => return Err(anyhow!("Unknown identity provider backend: {}", other)),
        };

        let catalog_service: Arc<dyn CatalogService> = match settings.catalog.backend.as_str() {
            "memory" => Arc::new(RealCatalogService::new(Arc::new(MemoryCatalogRepo::new()))),
            other => return Err(anyhow!("Unknown catalog backend: {}", other)),
        };

        if auth.access_ttl_secs == 0 || auth.refresh_ttl_secs == 0 {
            return Err(anyhow!("token lifetimes must be at least one second"));
        }
        let token_issuer = Arc::new(TokenIssuer::new(
            token_codec.clone(),
            session_store.clone(),
            TokenLifetimes {
                access_ttl: Duration::from_secs(auth.access_ttl_secs),
                refresh_ttl: Duration::from_secs(auth.refresh_ttl_secs),
            },
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            token_issuer,
            token_codec,
            session_store.clone(),
            identity_provider,
        ));

        let frontend = Frontend::try_new(&auth.frontend_url)?;
        let server = Self::new(auth_service, catalog_service, frontend);

        if auth.sweep_interval_secs == 0 {
            return Err(anyhow!("auth.sweep_interval_secs must be at least one second"));
        }
        let sweeper = TokenSweeper::new(
            session_store,
            Duration::from_secs(auth.sweep_interval_secs),
            server.cancel.clone(),
        );
        let sweeper_handle = tokio::spawn(async move {
            sweeper.run().await;
        });
        if let Ok(mut slot) = server.sweeper_handle.lock() {
            *slot = Some(sweeper_handle);
        }

        info!(
            store = %auth.store.backend,
            provider = %provider.backend,
            "server started"
        );

        Ok(server)
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self.sweeper_handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }
    }
}
