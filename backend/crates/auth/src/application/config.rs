//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// `token_type` returned with every token pair
pub const TOKEN_TYPE: &str = "Bearer";

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access-token signatures
    pub jwt_secret: Vec<u8>,
    /// Access-token lifetime, also its cache TTL (72 hours)
    pub access_token_ttl: Duration,
    /// Refresh session lifetime (30 days)
    pub refresh_session_ttl: Duration,
    /// Refresh-token entropy in bytes
    pub refresh_token_bytes: usize,
    /// Google OAuth client id; Google sign-in is off when unset
    pub google_client_id: Option<String>,
    /// LINE channel id; LINE sign-in is off when unset
    pub line_channel_id: Option<String>,
    /// Per-request timeout for identity provider calls
    pub provider_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(72 * 3600), // 72 hours
            refresh_session_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            refresh_token_bytes: 32,
            google_client_id: None,
            line_channel_id: None,
            provider_timeout: Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// `expires_in` reported to clients
    pub fn access_token_ttl_secs(&self) -> u64 {
        self.access_token_ttl.as_secs()
    }

    pub fn refresh_session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.refresh_session_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(30))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_session_ttl", &self.refresh_session_ttl)
            .field("refresh_token_bytes", &self.refresh_token_bytes)
            .field("google_client_id", &self.google_client_id)
            .field("line_channel_id", &self.line_channel_id)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl_secs(), 259_200);
        assert_eq!(config.refresh_session_ttl_chrono(), chrono::Duration::days(30));
        assert_eq!(config.refresh_token_bytes, 32);
    }

    #[test]
    fn test_random_secret() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_eq!(a.jwt_secret.len(), 32);
        assert_ne!(a.jwt_secret, b.jwt_secret);
        assert!(!format!("{a:?}").contains(&format!("{:?}", a.jwt_secret)));
    }
}
