//! Authenticate Use Case
//!
//! Guards protected routes: the bearer token must verify and must still be
//! the user's current cached token.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::application::token_signer::TokenSigner;
use crate::domain::repository::AccessTokenStore;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Caller identity placed in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: UserRole,
}

/// Authenticate use case
pub struct AuthenticateUseCase<A>
where
    A: AccessTokenStore,
{
    token_store: Arc<A>,
    signer: TokenSigner,
}

impl<A> AuthenticateUseCase<A>
where
    A: AccessTokenStore,
{
    pub fn new(token_store: Arc<A>, signer: TokenSigner) -> Self {
        Self {
            token_store,
            signer,
        }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        let verified = self.signer.verify(access_token)?;

        let current = self.token_store.get(&verified.user_id).await?;
        match current {
            Some(current) if constant_time_eq(current.as_bytes(), access_token.as_bytes()) => {
                Ok(AuthenticatedUser {
                    user_id: verified.user_id,
                    role: verified.role,
                })
            }
            _ => Err(AuthError::AccessTokenRevoked),
        }
    }
}
