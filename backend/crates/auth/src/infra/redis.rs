//! Redis Access-Token Store
//!
//! One key per user holding their current access token, expiring with it.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use crate::domain::repository::AccessTokenStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

pub const DEFAULT_KEY_PREFIX: &str = "app_token:";

/// GET and DEL in one step, so a token written in between is never removed
const DELETE_IF_CURRENT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Redis-backed access-token store
#[derive(Clone)]
pub struct RedisAccessTokenStore {
    conn: ConnectionManager,
    key_prefix: String,
    delete_if_current: Script,
}

impl RedisAccessTokenStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            delete_if_current: Script::new(DELETE_IF_CURRENT),
        }
    }

    /// Connect and verify the server answers
    pub async fn connect(url: &str) -> AuthResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let store = Self::new(conn);
        store.ping().await?;
        Ok(store)
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub async fn ping(&self) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn key(&self, user_id: &UserId) -> String {
        token_key(&self.key_prefix, user_id)
    }
}

fn token_key(prefix: &str, user_id: &UserId) -> String {
    format!("{prefix}{user_id}")
}

/// Seconds for `SET EX`, which rejects 0
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl AccessTokenStore for RedisAccessTokenStore {
    async fn set(&self, user_id: &UserId, token: &str, ttl: Duration) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(self.key(user_id), token, expiry_secs(ttl)).await?;
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> AuthResult<Option<String>> {
        let mut conn = self.conn.clone();
        let token: Option<String> = conn.get(self.key(user_id)).await?;
        Ok(token)
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(self.key(user_id)).await?;
        Ok(())
    }

    async fn delete_if_current(&self, user_id: &UserId, token: &str) -> AuthResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = self
            .delete_if_current
            .key(self.key(user_id))
            .arg(token)
            .invoke_async(&mut conn)
            .await?;
        Ok(removed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_format() {
        let user_id: UserId = "6f1c2a4e-8b3d-4c5e-9f70-1a2b3c4d5e6f".parse().unwrap();
        assert_eq!(
            token_key(DEFAULT_KEY_PREFIX, &user_id),
            "app_token:6f1c2a4e-8b3d-4c5e-9f70-1a2b3c4d5e6f"
        );
        assert_eq!(
            token_key("staging:", &user_id),
            "staging:6f1c2a4e-8b3d-4c5e-9f70-1a2b3c4d5e6f"
        );
    }

    #[test]
    fn test_expiry_never_zero() {
        assert_eq!(expiry_secs(Duration::from_secs(72 * 3600)), 259_200);
        assert_eq!(expiry_secs(Duration::from_millis(1500)), 1);
        assert_eq!(expiry_secs(Duration::from_millis(200)), 1);
        assert_eq!(expiry_secs(Duration::ZERO), 1);
    }
}
