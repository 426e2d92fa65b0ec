use crate::application_port::AuthError;
use crate::domain_model::RefreshTokenRecord;
use crate::domain_port::RefreshTokenStore;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Process-local refresh token registry. Everything is lost on restart,
/// which invalidates all sessions.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    records: DashMap<String, RefreshTokenRecord>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.records.contains_key(token)
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn put(&self, token: &str, record: RefreshTokenRecord) -> Result<(), AuthError> {
        self.records.insert(token.to_owned(), record);
        Ok(())
    }

    async fn take(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        // remove holds the shard lock, so concurrent takers race on one entry
        Ok(self.records.remove(token).map(|(_, record)| record))
    }

    async fn remove(&self, token: &str) -> Result<(), AuthError> {
        self.records.remove(token);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AuthError> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
