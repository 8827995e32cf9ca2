//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256, constant-time compare)
//! - Bearer token extraction from `Authorization` headers
//! - Outbound HTTP client construction with bounded timeouts

pub mod bearer;
pub mod crypto;
pub mod http_client;
