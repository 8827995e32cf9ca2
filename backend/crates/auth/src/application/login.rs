//! Login Use Case
//!
//! Exchanges a provider credential for a token pair.

use std::sync::Arc;

use crate::application::flow::{AuthFlow, FlowStage};
use crate::application::token_issuer::{TokenIssuer, TokenPair};
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::domain::verifier::VerifierRegistry;
use crate::error::AuthResult;

/// Login input
pub struct LoginInput {
    /// Provider name, e.g. `google`
    pub provider: String,
    /// Provider-issued credential (ID token)
    pub credential: String,
}

/// Login use case
pub struct LoginUseCase<U, S, A>
where
    U: UserDirectory,
    S: SessionRepository,
    A: AccessTokenStore,
{
    user_repo: Arc<U>,
    verifiers: Arc<VerifierRegistry>,
    issuer: TokenIssuer<S, A>,
}

impl<U, S, A> LoginUseCase<U, S, A>
where
    U: UserDirectory,
    S: SessionRepository,
    A: AccessTokenStore,
{
    pub fn new(
        user_repo: Arc<U>,
        verifiers: Arc<VerifierRegistry>,
        issuer: TokenIssuer<S, A>,
    ) -> Self {
        Self {
            user_repo,
            verifiers,
            issuer,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<TokenPair> {
        let mut flow = AuthFlow::begin("login");
        match self.run(&input, &mut flow).await {
            Ok(pair) => {
                flow.complete();
                Ok(pair)
            }
            Err(err) => Err(flow.fail(err)),
        }
    }

    async fn run(&self, input: &LoginInput, flow: &mut AuthFlow) -> AuthResult<TokenPair> {
        let identity = self
            .verifiers
            .verify(&input.provider, &input.credential)
            .await?;

        flow.advance(FlowStage::Syncing);
        let user = self
            .user_repo
            .find_or_create_by_social_identity(&identity)
            .await?;

        let pair = self.issuer.issue(&user, flow).await?;

        tracing::info!(
            user_id = %user.user_id,
            provider = %identity.provider,
            "User logged in"
        );

        Ok(pair)
    }
}
