//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the identity
//! verification seam.

pub mod entity;
pub mod repository;
pub mod value_object;
pub mod verifier;

// Re-exports
pub use entity::{session::Session, user::User};
pub use repository::{AccessTokenStore, SessionRepository, UserDirectory};
pub use verifier::{IdentityVerifier, VerifierRegistry, VerifyError};
