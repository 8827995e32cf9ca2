//! Logout Use Case
//!
//! Drops the user's cached access token. Refresh sessions are left alone.

use std::sync::Arc;

use crate::domain::repository::AccessTokenStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<A>
where
    A: AccessTokenStore,
{
    token_store: Arc<A>,
}

impl<A> LogoutUseCase<A>
where
    A: AccessTokenStore,
{
    pub fn new(token_store: Arc<A>) -> Self {
        Self { token_store }
    }

    pub async fn execute(&self, user_id: &UserId) -> AuthResult<()> {
        self.token_store.delete(user_id).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}
