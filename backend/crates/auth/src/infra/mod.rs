//! Infrastructure Layer
//!
//! Database, cache and identity-provider implementations.

pub mod identity;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use identity::{GoogleVerifier, LineVerifier, registry_from_config};
pub use memory::{MemoryAccessTokenStore, MemoryAuthRepository, StaticIdentityVerifier};
pub use postgres::PgAuthRepository;
pub use self::redis::RedisAccessTokenStore;
