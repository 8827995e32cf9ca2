//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use middleware::require_access_token;
pub use router::{PgRedisAuth, auth_router, auth_router_generic};
