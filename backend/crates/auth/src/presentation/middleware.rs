//! Auth Middleware
//!
//! Bearer-token guard for protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer_token;

use crate::application::AuthOrchestrator;
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::error::AuthError;

/// Middleware that requires a current access token.
/// Puts `AuthenticatedUser` into request extensions.
pub async fn require_access_token<R, T>(
    State(auth): State<AuthOrchestrator<R, T>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    let token = extract_bearer_token(req.headers())?.to_owned();

    let user = auth.authenticate(&token).await?;
    tracing::debug!(user_id = %user.user_id, role = %user.role, "Request authenticated");

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
