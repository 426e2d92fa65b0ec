use crate::application_port::AuthError;
use crate::domain_model::RefreshTokenRecord;
use chrono::{DateTime, Utc};

/// Registry of outstanding refresh tokens, keyed by the token string.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert or overwrite the record for a token.
    async fn put(&self, token: &str, record: RefreshTokenRecord) -> Result<(), AuthError>;
    /// Look up and remove in one atomic step. Of two concurrent calls for the
    /// same token at most one sees `Some`.
    async fn take(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;
    /// Delete a token. Deleting an unknown token is not an error.
    async fn remove(&self, token: &str) -> Result<(), AuthError>;
    /// Drop every record that expired at or before `now`; returns how many went.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AuthError>;
}
