//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and verifier traits
//! - `application/` - Login / refresh / logout / authenticate use cases
//! - `infra/` - PostgreSQL, Redis, in-memory and identity-provider adapters
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Social login with Google or LINE ID tokens
//! - Short-lived JWT access tokens, one live token per user (Redis)
//! - Long-lived refresh sessions with single-use rotation (PostgreSQL)
//! - Role claims (Citizen, Officer, Admin)
//!
//! ## Security Model
//! - Refresh tokens are stored as SHA-256 digests only
//! - Rotation is an atomic conditional update; a replayed token loses
//! - A failed token issue rolls back its access-token entry

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{AuthOrchestrator, config::AuthConfig};
pub use error::{AuthError, AuthResult};
pub use infra::{PgAuthRepository, RedisAccessTokenStore, registry_from_config};
pub use presentation::router::{PgRedisAuth, auth_router};
