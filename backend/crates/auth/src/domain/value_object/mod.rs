//! Value Object Module

pub mod refresh_token;
pub mod session_id;
pub mod social_identity;
pub mod social_provider;
pub mod user_id;
pub mod user_role;
