//! In-memory implementations for development and testing
//!
//! Same contracts as the Postgres and Redis backends, kept in process.
//! Each store can be switched into an "unavailable" mode to exercise
//! outage handling.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::domain::value_object::{
    refresh_token::RefreshTokenDigest,
    session_id::SessionId,
    social_identity::{SocialIdentity, SubjectId},
    social_provider::SocialProvider,
    user_id::UserId,
};
use crate::domain::verifier::{IdentityVerifier, VerifyError};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Users and sessions
// ============================================================================

#[derive(Default)]
struct AuthState {
    users: HashMap<UserId, User>,
    identities: HashMap<SocialIdentity, UserId>,
    sessions: HashMap<SessionId, Session>,
    by_digest: HashMap<RefreshTokenDigest, SessionId>,
}

/// In-memory user directory and session store
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<RwLock<AuthState>>,
    sessions_unavailable: Arc<AtomicBool>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make session operations fail with `StoreUnavailable`
    pub fn set_sessions_unavailable(&self, unavailable: bool) {
        self.sessions_unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_sessions(&self) -> AuthResult<()> {
        if self.sessions_unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable("session store offline".into()));
        }
        Ok(())
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.user_id, user);
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    pub async fn session(&self, session_id: &SessionId) -> Option<Session> {
        self.state.read().await.sessions.get(session_id).cloned()
    }

    /// Sessions for `user_id` that are neither revoked nor expired
    pub async fn active_sessions_for(&self, user_id: &UserId) -> Vec<Session> {
        let now = Utc::now();
        self.state
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.user_id == *user_id && !s.is_revoked() && !s.is_expired_at(now))
            .cloned()
            .collect()
    }
}

impl UserDirectory for MemoryAuthRepository {
    async fn find_or_create_by_social_identity(
        &self,
        identity: &SocialIdentity,
    ) -> AuthResult<User> {
        let mut state = self.state.write().await;

        if let Some(user) = state
            .identities
            .get(identity)
            .and_then(|user_id| state.users.get(user_id))
        {
            return Ok(user.clone());
        }

        let user = User::new();
        state.identities.insert(identity.clone(), user.user_id);
        state.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }
}

impl SessionRepository for MemoryAuthRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        self.check_sessions()?;
        let mut state = self.state.write().await;

        if state.by_digest.contains_key(&session.refresh_token_digest) {
            return Err(AuthError::DuplicateRefreshToken);
        }

        state
            .by_digest
            .insert(session.refresh_token_digest, session.session_id);
        state.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_refresh_token(
        &self,
        digest: &RefreshTokenDigest,
    ) -> AuthResult<Option<Session>> {
        self.check_sessions()?;
        let state = self.state.read().await;
        Ok(state
            .by_digest
            .get(digest)
            .and_then(|id| state.sessions.get(id))
            .cloned())
    }

    async fn revoke(&self, session_id: &SessionId) -> AuthResult<()> {
        self.check_sessions()?;
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or(AuthError::SessionNotFound)?;
        session.revoke(Utc::now());
        Ok(())
    }

    async fn consume(&self, session_id: &SessionId) -> AuthResult<bool> {
        self.check_sessions()?;
        let mut state = self.state.write().await;
        match state.sessions.get_mut(session_id) {
            Some(session) if !session.is_revoked() => {
                session.revoke(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cleanup_spent(&self) -> AuthResult<u64> {
        self.check_sessions()?;
        let now = Utc::now();
        let mut state = self.state.write().await;

        let spent: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.is_revoked() && s.is_expired_at(now))
            .cloned()
            .collect();

        for session in &spent {
            state.sessions.remove(&session.session_id);
            state.by_digest.remove(&session.refresh_token_digest);
        }

        Ok(spent.len() as u64)
    }
}

// ============================================================================
// Access tokens
// ============================================================================

/// In-memory access-token store with per-entry expiry
#[derive(Clone, Default)]
pub struct MemoryAccessTokenStore {
    entries: Arc<RwLock<HashMap<UserId, (String, Instant)>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryAccessTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable("token store offline".into()));
        }
        Ok(())
    }

    pub async fn live_entries(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires)| *expires > now)
            .count()
    }
}

impl AccessTokenStore for MemoryAccessTokenStore {
    async fn set(&self, user_id: &UserId, token: &str, ttl: Duration) -> AuthResult<()> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(*user_id, (token.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> AuthResult<Option<String>> {
        self.check()?;
        let mut entries = self.entries.write().await;
        match entries.get(user_id) {
            Some((token, expires)) if *expires > Instant::now() => Ok(Some(token.clone())),
            Some(_) => {
                entries.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        self.check()?;
        self.entries.write().await.remove(user_id);
        Ok(())
    }

    async fn delete_if_current(&self, user_id: &UserId, token: &str) -> AuthResult<bool> {
        self.check()?;
        let mut entries = self.entries.write().await;
        match entries.get(user_id) {
            Some((current, _)) if current == token => {
                entries.remove(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ============================================================================
// Identity verification
// ============================================================================

/// Verifier answering from a fixed credential table
pub struct StaticIdentityVerifier {
    provider: SocialProvider,
    credentials: HashMap<String, String>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl StaticIdentityVerifier {
    pub fn new(provider: SocialProvider) -> Self {
        Self {
            provider,
            credentials: HashMap::new(),
            unavailable: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Accept `credential` as proof of `subject`
    pub fn with_credential(mut self, credential: &str, subject: &str) -> Self {
        self.credentials
            .insert(credential.to_string(), subject.to_string());
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `verify` calls that reached this adapter
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    fn provider(&self) -> SocialProvider {
        self.provider
    }

    async fn verify(&self, credential: &str) -> Result<SubjectId, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(VerifyError::ProviderUnavailable(format!(
                "{} offline",
                self.provider
            )));
        }

        let subject = self
            .credentials
            .get(credential)
            .ok_or_else(|| VerifyError::InvalidCredential("unknown credential".into()))?;

        SubjectId::new(subject.as_str())
            .map_err(|_| VerifyError::InvalidCredential("empty subject".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::refresh_token::RefreshToken;

    fn identity(provider: SocialProvider, subject: &str) -> SocialIdentity {
        SocialIdentity::new(provider, SubjectId::new(subject).unwrap())
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let repo = MemoryAuthRepository::new();
        let google = identity(SocialProvider::Google, "42");

        let first = repo.find_or_create_by_social_identity(&google).await.unwrap();
        let second = repo.find_or_create_by_social_identity(&google).await.unwrap();
        assert_eq!(first.user_id, second.user_id);

        // Same raw subject under another provider is another person
        let line = identity(SocialProvider::Line, "42");
        let other = repo.find_or_create_by_social_identity(&line).await.unwrap();
        assert_ne!(first.user_id, other.user_id);
        assert_eq!(repo.user_count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_digest_rejected() {
        let repo = MemoryAuthRepository::new();
        let token = RefreshToken::generate(32);
        let user_id = UserId::new();

        let a = Session::new(user_id, &token, chrono::Duration::days(1));
        let b = Session::new(user_id, &token, chrono::Duration::days(1));
        repo.create(&a).await.unwrap();
        assert!(matches!(
            repo.create(&b).await,
            Err(AuthError::DuplicateRefreshToken)
        ));
    }

    #[tokio::test]
    async fn test_revoke_and_consume() {
        let repo = MemoryAuthRepository::new();
        let session = Session::new(UserId::new(), &RefreshToken::generate(32), chrono::Duration::days(1));
        repo.create(&session).await.unwrap();

        assert!(repo.consume(&session.session_id).await.unwrap());
        assert!(!repo.consume(&session.session_id).await.unwrap());

        // revoke stays idempotent on an already revoked row
        repo.revoke(&session.session_id).await.unwrap();
        assert!(matches!(
            repo.revoke(&SessionId::new()).await,
            Err(AuthError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_cleanup_spent() {
        let repo = MemoryAuthRepository::new();
        let user_id = UserId::new();
        let live = Session::new(user_id, &RefreshToken::generate(32), chrono::Duration::days(1));
        let expired = Session::new(user_id, &RefreshToken::generate(32), chrono::Duration::seconds(-5));
        let spent = Session::new(user_id, &RefreshToken::generate(32), chrono::Duration::seconds(-5));
        repo.create(&live).await.unwrap();
        repo.create(&expired).await.unwrap();
        repo.create(&spent).await.unwrap();
        repo.revoke(&spent.session_id).await.unwrap();
        repo.revoke(&live.session_id).await.unwrap();

        // only revoked and expired rows go
        assert_eq!(repo.cleanup_spent().await.unwrap(), 1);
        assert_eq!(repo.session_count().await, 2);
        assert!(
            repo.find_by_refresh_token(&spent.refresh_token_digest)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_by_refresh_token(&expired.refresh_token_digest)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_access_token_ttl() {
        let store = MemoryAccessTokenStore::new();
        let user_id = UserId::new();

        store.set(&user_id, "t1", Duration::from_secs(60)).await.unwrap();
        store.set(&user_id, "t2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get(&user_id).await.unwrap().as_deref(), Some("t2"));

        store.set(&user_id, "t3", Duration::ZERO).await.unwrap();
        assert_eq!(store.get(&user_id).await.unwrap(), None);

        // deleting a missing entry is fine
        store.delete(&user_id).await.unwrap();
        store.delete(&user_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_if_current() {
        let store = MemoryAccessTokenStore::new();
        let user_id = UserId::new();

        store.set(&user_id, "older", Duration::from_secs(60)).await.unwrap();
        store.set(&user_id, "newer", Duration::from_secs(60)).await.unwrap();

        assert!(!store.delete_if_current(&user_id, "older").await.unwrap());
        assert_eq!(store.get(&user_id).await.unwrap().as_deref(), Some("newer"));

        assert!(store.delete_if_current(&user_id, "newer").await.unwrap());
        assert_eq!(store.get(&user_id).await.unwrap(), None);
        assert!(!store.delete_if_current(&user_id, "newer").await.unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = MemoryAccessTokenStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get(&UserId::new()).await,
            Err(AuthError::StoreUnavailable(_))
        ));
    }
}
