use crate::domain_port::RefreshTokenStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Periodically drops expired refresh tokens, outside any request.
pub struct TokenSweeper {
    session_store: Arc<dyn RefreshTokenStore>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl TokenSweeper {
    pub fn new(
        session_store: Arc<dyn RefreshTokenStore>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            session_store,
            interval,
            cancellation_token,
        }
    }

    pub async fn tick_once(&self) -> anyhow::Result<usize> {
        let removed = self.session_store.sweep_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::debug!(removed, "swept expired refresh tokens");
        }
        Ok(removed)
    }

    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("token sweeper shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick_once().await {
                        tracing::error!("token sweeper error: {:#}", e);
                    }
                }
            }
        }
    }
}
