//! Token Pair Issuance
//!
//! Shared tail of login and refresh: sign, cache, open a refresh session.

use std::sync::Arc;

use crate::application::config::{AuthConfig, TOKEN_TYPE};
use crate::application::flow::{AuthFlow, FlowStage};
use crate::application::token_signer::TokenSigner;
use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{AccessTokenStore, SessionRepository};
use crate::domain::value_object::refresh_token::RefreshToken;
use crate::error::AuthResult;

/// Tokens handed to the client
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires
    pub expires_in: u64,
}

pub struct TokenIssuer<S, A>
where
    S: SessionRepository,
    A: AccessTokenStore,
{
    session_repo: Arc<S>,
    token_store: Arc<A>,
    signer: TokenSigner,
    config: Arc<AuthConfig>,
}

impl<S, A> TokenIssuer<S, A>
where
    S: SessionRepository,
    A: AccessTokenStore,
{
    pub fn new(
        session_repo: Arc<S>,
        token_store: Arc<A>,
        signer: TokenSigner,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            session_repo,
            token_store,
            signer,
            config,
        }
    }

    /// Issue a fresh access token and refresh session for `user`.
    ///
    /// The access token is cached before the session is written. If the
    /// session write fails the cache entry is removed again, unless a
    /// concurrent issue for the same user has already replaced it.
    pub async fn issue(&self, user: &User, flow: &mut AuthFlow) -> AuthResult<TokenPair> {
        flow.advance(FlowStage::Issuing);
        let signed = self.signer.issue(&user.user_id, user.user_role)?;
        let refresh_token = RefreshToken::generate(self.config.refresh_token_bytes);
        let session = Session::new(
            user.user_id,
            &refresh_token,
            self.config.refresh_session_ttl_chrono(),
        );

        flow.advance(FlowStage::Persisting);
        self.token_store
            .set(&user.user_id, &signed.token, self.signer.ttl())
            .await?;

        if let Err(err) = self.session_repo.create(&session).await {
            match self
                .token_store
                .delete_if_current(&user.user_id, &signed.token)
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::debug!(
                    user_id = %user.user_id,
                    "Access token already replaced, nothing to roll back"
                ),
                Err(cleanup) => tracing::error!(
                    user_id = %user.user_id,
                    error = %cleanup,
                    "Failed to roll back access token after session write failure"
                ),
            }
            return Err(err);
        }

        tracing::debug!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "Token pair issued"
        );

        Ok(TokenPair {
            access_token: signed.token,
            refresh_token: refresh_token.into_string(),
            token_type: TOKEN_TYPE,
            expires_in: self.signer.ttl().as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::value_object::{refresh_token::RefreshTokenDigest, session_id::SessionId};
    use crate::error::AuthError;
    use crate::infra::memory::{MemoryAccessTokenStore, MemoryAuthRepository};

    /// Session store that loses a race: another login for the same user
    /// replaces the cached token, then the session write fails.
    struct OvertakenSessions {
        inner: MemoryAuthRepository,
        tokens: MemoryAccessTokenStore,
    }

    impl SessionRepository for OvertakenSessions {
        async fn create(&self, session: &Session) -> AuthResult<()> {
            self.tokens
                .set(&session.user_id, "newer-login", Duration::from_secs(60))
                .await?;
            Err(AuthError::StoreUnavailable("session store offline".into()))
        }

        async fn find_by_refresh_token(
            &self,
            digest: &RefreshTokenDigest,
        ) -> AuthResult<Option<Session>> {
            self.inner.find_by_refresh_token(digest).await
        }

        async fn revoke(&self, session_id: &SessionId) -> AuthResult<()> {
            self.inner.revoke(session_id).await
        }

        async fn consume(&self, session_id: &SessionId) -> AuthResult<bool> {
            self.inner.consume(session_id).await
        }

        async fn cleanup_spent(&self) -> AuthResult<u64> {
            self.inner.cleanup_spent().await
        }
    }

    fn issuer<S: SessionRepository>(
        sessions: S,
        tokens: MemoryAccessTokenStore,
    ) -> TokenIssuer<S, MemoryAccessTokenStore> {
        let config = AuthConfig::with_random_secret();
        let signer = TokenSigner::hmac(&config.jwt_secret, config.access_token_ttl);
        TokenIssuer::new(Arc::new(sessions), Arc::new(tokens), signer, Arc::new(config))
    }

    #[tokio::test]
    async fn test_failed_session_write_removes_own_token() {
        let sessions = MemoryAuthRepository::new();
        sessions.set_sessions_unavailable(true);
        let tokens = MemoryAccessTokenStore::new();
        let issuer = issuer(sessions, tokens.clone());

        let user = User::new();
        let mut flow = AuthFlow::begin("login");
        let err = issuer.issue(&user, &mut flow).await.unwrap_err();

        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert_eq!(tokens.get(&user.user_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_session_write_keeps_newer_token() {
        let tokens = MemoryAccessTokenStore::new();
        let sessions = OvertakenSessions {
            inner: MemoryAuthRepository::new(),
            tokens: tokens.clone(),
        };
        let issuer = issuer(sessions, tokens.clone());

        let user = User::new();
        let mut flow = AuthFlow::begin("login");
        let err = issuer.issue(&user, &mut flow).await.unwrap_err();

        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert_eq!(
            tokens.get(&user.user_id).await.unwrap().as_deref(),
            Some("newer-login")
        );
    }
}
