//! Auth Router

use axum::{Router, middleware::from_fn_with_state, routing::post};

use crate::application::AuthOrchestrator;
use crate::domain::repository::{AccessTokenStore, SessionRepository, UserDirectory};
use crate::infra::{postgres::PgAuthRepository, redis::RedisAccessTokenStore};
use crate::presentation::{handlers, middleware};

/// Orchestrator over the production backends
pub type PgRedisAuth = AuthOrchestrator<PgAuthRepository, RedisAccessTokenStore>;

/// Create the Auth router with PostgreSQL sessions and Redis access tokens
pub fn auth_router(auth: PgRedisAuth) -> Router {
    auth_router_generic(auth)
}

/// Create a generic Auth router for any store implementation
pub fn auth_router_generic<R, T>(auth: AuthOrchestrator<R, T>) -> Router
where
    R: UserDirectory + SessionRepository + Send + Sync + 'static,
    T: AccessTokenStore + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(handlers::login::<R, T>))
        .route("/refresh", post(handlers::refresh::<R, T>))
        .route(
            "/logout",
            post(handlers::logout::<R, T>).route_layer(from_fn_with_state(
                auth.clone(),
                middleware::require_access_token::<R, T>,
            )),
        )
        .with_state(auth)
}
