//! Refresh Session Entity
//!
//! Durable record behind a refresh token. Rows are never reactivated:
//! once `revoked_at` is set the session is dead.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{
    refresh_token::{RefreshToken, RefreshTokenDigest},
    session_id::SessionId,
    user_id::UserId,
};

/// Lifecycle state derived from timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
    Revoked,
}

/// Refresh session entity
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// SHA-256 of the refresh token handed to the client
    pub refresh_token_digest: RefreshTokenDigest,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session. TTL comes from `AuthConfig`.
    pub fn new(user_id: UserId, refresh_token: &RefreshToken, ttl: Duration) -> Self {
        Self::issued_at(user_id, refresh_token, Utc::now(), ttl)
    }

    pub fn issued_at(
        user_id: UserId,
        refresh_token: &RefreshToken,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id,
            refresh_token_digest: refresh_token.digest(),
            expires_at: now + ttl,
            created_at: now,
            revoked_at: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if self.is_revoked() {
            SessionState::Revoked
        } else if self.is_expired_at(now) {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    pub fn state(&self) -> SessionState {
        self.state_at(Utc::now())
    }

    /// Mark revoked. Keeps the first revocation time.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(now);
        }
    }
}
