//! Auth Orchestrator
//!
//! Single entry point for login, refresh, logout and request authentication.
//! Cloning is cheap; every clone shares the same stores.

use std::sync::Arc;

use crate::application::authenticate::{AuthenticateUseCase, AuthenticatedUser};
use crate::application::config::AuthConfig;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::refresh::RefreshUseCase;
use crate::application::token_issuer::{TokenIssuer, TokenPair};
use crate::application::token_signer::TokenSigner;
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::domain::value_object::user_id::UserId;
use crate::domain::verifier::VerifierRegistry;
use crate::error::AuthResult;

pub struct AuthOrchestrator<R, T>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    repo: Arc<R>,
    token_store: Arc<T>,
    verifiers: Arc<VerifierRegistry>,
    signer: TokenSigner,
    config: Arc<AuthConfig>,
}

impl<R, T> Clone for AuthOrchestrator<R, T>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            token_store: self.token_store.clone(),
            verifiers: self.verifiers.clone(),
            signer: self.signer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, T> AuthOrchestrator<R, T>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    /// Build an orchestrator signing with the HMAC secret in `config`
    pub fn new(repo: R, token_store: T, verifiers: VerifierRegistry, config: AuthConfig) -> Self {
        let signer = TokenSigner::hmac(&config.jwt_secret, config.access_token_ttl);
        Self::with_signer(repo, token_store, verifiers, signer, config)
    }

    pub fn with_signer(
        repo: R,
        token_store: T,
        verifiers: VerifierRegistry,
        signer: TokenSigner,
        config: AuthConfig,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            token_store: Arc::new(token_store),
            verifiers: Arc::new(verifiers),
            signer,
            config: Arc::new(config),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn issuer(&self) -> TokenIssuer<R, T> {
        TokenIssuer::new(
            self.repo.clone(),
            self.token_store.clone(),
            self.signer.clone(),
            self.config.clone(),
        )
    }

    pub async fn login(&self, provider: &str, credential: &str) -> AuthResult<TokenPair> {
        let use_case = LoginUseCase::new(self.repo.clone(), self.verifiers.clone(), self.issuer());

        use_case
            .execute(LoginInput {
                provider: provider.to_string(),
                credential: credential.to_string(),
            })
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let use_case = RefreshUseCase::new(self.repo.clone(), self.repo.clone(), self.issuer());
        use_case.execute(refresh_token).await
    }

    pub async fn logout(&self, user_id: &UserId) -> AuthResult<()> {
        LogoutUseCase::new(self.token_store.clone())
            .execute(user_id)
            .await
    }

    pub async fn authenticate(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        AuthenticateUseCase::new(self.token_store.clone(), self.signer.clone())
            .execute(access_token)
            .await
    }

    /// Purge refresh sessions that can no longer change any refresh outcome
    pub async fn cleanup_spent_sessions(&self) -> AuthResult<u64> {
        self.repo.cleanup_spent().await
    }
}
