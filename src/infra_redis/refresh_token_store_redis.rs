use crate::application_port::AuthError;
use crate::domain_model::RefreshTokenRecord;
use crate::domain_port::RefreshTokenStore;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const REFRESH_TAKE: &str = include_str!("refresh_take.lua");

/// Refresh token registry shared by every instance pointed at the same Redis.
///
/// Records are stored as JSON with a TTL matching their expiry, so Redis
/// evicts them on its own and `sweep_expired` has nothing to do.
pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
    take_script: Script,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
            take_script: Script::new(REFRESH_TAKE),
        }
    }

    fn key(&self, token: &str) -> String {
        record_key(&self.prefix, token)
    }
}

fn record_key(prefix: &str, token: &str) -> String {
    format!("{}:{}", prefix, token)
}

fn ttl_secs(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let secs = (until - now).num_seconds();
    if secs <= 0 { 1 } else { secs as u64 }
}

fn store_err(e: impl std::fmt::Display) -> AuthError {
    AuthError::Store(e.to_string())
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn put(&self, token: &str, record: RefreshTokenRecord) -> Result<(), AuthError> {
        let key = self.key(token);
        let ttl = ttl_secs(record.expires_at, Utc::now());
        let payload = serde_json::to_string(&record).map_err(store_err)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, payload, ttl).await.map_err(store_err)?;
        Ok(())
    }

    async fn take(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let payload: Option<String> = self
            .take_script
            .key(&key)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;

        payload
            .map(|p| serde_json::from_str::<RefreshTokenRecord>(&p).map_err(store_err))
            .transpose()
    }

    async fn remove(&self, token: &str) -> Result<(), AuthError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let _: () = conn.del(&key).await.map_err(store_err)?;
        Ok(())
    }

    async fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<usize, AuthError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::Identity;
    use chrono::Duration;
    use std::sync::Arc;

    const REDIS_URL_VAR: &str = "LENSCAT_TEST_REDIS_URL";

    async fn live_store() -> Option<RedisRefreshTokenStore> {
        let Ok(url) = std::env::var(REDIS_URL_VAR) else {
            eprintln!("{REDIS_URL_VAR} not set, skipping test");
            return None;
        };
        let conn = match redis::Client::open(url.as_str()) {
            Ok(client) => client.get_connection_manager().await,
            Err(e) => Err(e),
        };
        match conn {
            Ok(conn) => Some(RedisRefreshTokenStore::new(
                conn,
                format!("lenscat-test:{}", uuid::Uuid::new_v4()),
            )),
            Err(e) => {
                eprintln!("redis at {url} unreachable ({e}), skipping test");
                None
            }
        }
    }

    fn record() -> RefreshTokenRecord {
        RefreshTokenRecord::new(Identity::new("42", "alice"), Utc::now() + Duration::minutes(5))
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at LENSCAT_TEST_REDIS_URL"]
    async fn take_hands_out_a_record_once() {
        let Some(store) = live_store().await else {
            return;
        };
        let record = record();

        store.put("r1", record.clone()).await.unwrap();
        assert_eq!(store.take("r1").await.unwrap(), Some(record));
        assert_eq!(store.take("r1").await.unwrap(), None);
        assert_eq!(store.take("never-issued").await.unwrap(), None);

        store.put("r2", self::record()).await.unwrap();
        store.remove("r2").await.unwrap();
        store.remove("r2").await.unwrap();
        assert_eq!(store.take("r2").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires a Redis server at LENSCAT_TEST_REDIS_URL"]
    async fn concurrent_takes_have_one_winner() {
        let Some(store) = live_store().await else {
            return;
        };
        let store = Arc::new(store);
        store.put("contested", record()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take("contested").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[test]
    fn keys_are_namespaced_by_prefix() {
        assert_eq!(record_key("lenscat:refresh", "abc.def"), "lenscat:refresh:abc.def");
    }

    #[test]
    fn ttl_never_drops_below_one_second() {
        let now = Utc::now();
        assert_eq!(ttl_secs(now + Duration::seconds(90), now), 90);
        assert_eq!(ttl_secs(now, now), 1);
        assert_eq!(ttl_secs(now - Duration::hours(1), now), 1);
    }
}
