//! Refresh Use Case
//!
//! Rotates a refresh token: the presented session is consumed and a new
//! token pair replaces it.

use std::sync::Arc;

use crate::application::flow::{AuthFlow, FlowStage};
use crate::application::token_issuer::{TokenIssuer, TokenPair};
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::domain::value_object::refresh_token::RefreshToken;
use crate::error::{AuthError, AuthResult};

/// Refresh use case
pub struct RefreshUseCase<U, S, A>
where
    U: UserDirectory,
    S: SessionRepository,
    A: AccessTokenStore,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    issuer: TokenIssuer<S, A>,
}

impl<U, S, A> RefreshUseCase<U, S, A>
where
    U: UserDirectory,
    S: SessionRepository,
    A: AccessTokenStore,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, issuer: TokenIssuer<S, A>) -> Self {
        Self {
            user_repo,
            session_repo,
            issuer,
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let mut flow = AuthFlow::begin("refresh");
        match self.run(refresh_token, &mut flow).await {
            Ok(pair) => {
                flow.complete();
                Ok(pair)
            }
            Err(err) => Err(flow.fail(err)),
        }
    }

    async fn run(&self, refresh_token: &str, flow: &mut AuthFlow) -> AuthResult<TokenPair> {
        if refresh_token.is_empty() {
            return Err(AuthError::InvalidRefreshToken);
        }

        let digest = RefreshToken::from_client(refresh_token).digest();
        let session = self
            .session_repo
            .find_by_refresh_token(&digest)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if session.is_revoked() {
            tracing::warn!(
                session_id = %session.session_id,
                user_id = %session.user_id,
                "Revoked refresh token presented"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        if session.is_expired() {
            if let Err(err) = self.session_repo.revoke(&session.session_id).await {
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %err,
                    "Failed to revoke expired session"
                );
            }
            return Err(AuthError::RefreshTokenExpired);
        }

        flow.advance(FlowStage::Syncing);
        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Exactly one concurrent caller wins the rotation
        if !self.session_repo.consume(&session.session_id).await? {
            tracing::warn!(
                session_id = %session.session_id,
                user_id = %session.user_id,
                "Refresh token reused during rotation"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let pair = self.issuer.issue(&user, flow).await?;

        tracing::info!(
            user_id = %user.user_id,
            rotated_session_id = %session.session_id,
            "Refresh token rotated"
        );

        Ok(pair)
    }
}
