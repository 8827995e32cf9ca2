//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use std::time::Duration;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::value_object::{
    refresh_token::RefreshTokenDigest, session_id::SessionId, social_identity::SocialIdentity,
    user_id::UserId,
};
use crate::error::AuthResult;

/// User directory trait
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    /// Return the user linked to this identity, creating it on first sight.
    /// Concurrent calls for the same identity resolve to one user.
    async fn find_or_create_by_social_identity(&self, identity: &SocialIdentity)
    -> AuthResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;
}

/// Refresh session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Insert a new session. A digest collision is `DuplicateRefreshToken`.
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by refresh-token digest, revoked or not
    async fn find_by_refresh_token(&self, digest: &RefreshTokenDigest)
    -> AuthResult<Option<Session>>;

    /// Mark revoked. Idempotent; `SessionNotFound` only when the row is absent.
    async fn revoke(&self, session_id: &SessionId) -> AuthResult<()>;

    /// Revoke only if still active. `true` means this caller did the
    /// transition; concurrent callers see `false`.
    async fn consume(&self, session_id: &SessionId) -> AuthResult<bool>;

    /// Delete sessions that are both revoked and expired, returning how many
    /// went. Expired sessions nobody revoked yet are kept.
    async fn cleanup_spent(&self) -> AuthResult<u64>;
}

/// Access-token store trait (at most one live token per user)
#[trait_variant::make(AccessTokenStore: Send)]
pub trait LocalAccessTokenStore {
    /// Store the user's current token, replacing any previous one
    async fn set(&self, user_id: &UserId, token: &str, ttl: Duration) -> AuthResult<()>;

    /// Current token, `None` if absent or expired
    async fn get(&self, user_id: &UserId) -> AuthResult<Option<String>>;

    /// Remove the entry. Deleting a missing entry is not an error.
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;

    /// Remove the entry only while it still holds `token`, atomically.
    /// Returns whether anything was removed.
    async fn delete_if_current(&self, user_id: &UserId, token: &str) -> AuthResult<bool>;
}
