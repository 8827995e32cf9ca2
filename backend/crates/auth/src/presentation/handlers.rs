//! HTTP Handlers

use std::future::Future;

use axum::Json;
use axum::extract::{Extension, State};

use crate::application::AuthOrchestrator;
use crate::application::authenticate::AuthenticatedUser;
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ApiResponse, LoginResponse, RefreshTokenRequest, SocialLoginRequest,
};

/// Run a flow on its own task so a dropped connection cannot stop it
/// between store writes.
async fn run_detached<F, T>(flow: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(flow)
        .await
        .map_err(|e| AuthError::Internal(format!("auth flow task failed: {e}")))?
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, T>(
    State(auth): State<AuthOrchestrator<R, T>>,
    Json(req): Json<SocialLoginRequest>,
) -> AuthResult<Json<ApiResponse<LoginResponse>>>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    let pair =
        run_detached(async move { auth.login(&req.provider, &req.access_token).await }).await?;

    Ok(Json(ApiResponse::ok("Login successful", pair.into())))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R, T>(
    State(auth): State<AuthOrchestrator<R, T>>,
    Json(req): Json<RefreshTokenRequest>,
) -> AuthResult<Json<ApiResponse<LoginResponse>>>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    let pair = run_detached(async move { auth.refresh(&req.refresh_token).await }).await?;

    Ok(Json(ApiResponse::ok("Token refreshed", pair.into())))
}

// ============================================================================
// Logout (requires authentication)
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R, T>(
    State(auth): State<AuthOrchestrator<R, T>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AuthResult<Json<ApiResponse<()>>>
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    auth.logout(&user.user_id).await?;

    Ok(Json(ApiResponse::message("Logged out successfully")))
}
