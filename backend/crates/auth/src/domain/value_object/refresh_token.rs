//! Refresh token value object
//!
//! The raw token is handed to the client exactly once. Storage only ever sees
//! its SHA-256 digest.

use std::fmt;

use platform::crypto::{random_token_hex, sha256};

/// Minimum entropy for a refresh token (256 bits)
pub const MIN_REFRESH_TOKEN_BYTES: usize = 32;

/// Opaque, single-use refresh token
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Generate a new token with at least 256 bits of entropy.
    pub fn generate(entropy_bytes: usize) -> Self {
        Self(random_token_hex(entropy_bytes.max(MIN_REFRESH_TOKEN_BYTES)))
    }

    /// Wrap a token presented by a client. No validation: unknown values
    /// simply never match a stored digest.
    pub fn from_client(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn digest(&self) -> RefreshTokenDigest {
        RefreshTokenDigest(sha256(self.0.as_bytes()))
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// SHA-256 of a refresh token; the lookup key in the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTokenDigest([u8; 32]);

impl RefreshTokenDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for RefreshTokenDigest {
    type Error = Vec<u8>;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        <[u8; 32]>::try_from(bytes).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_have_256_bits() {
        let token = RefreshToken::generate(32);
        assert_eq!(token.as_str().len(), 64);

        // Requests below the floor are raised to it
        let token = RefreshToken::generate(8);
        assert_eq!(token.as_str().len(), 64);
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(RefreshToken::generate(32), RefreshToken::generate(32));
    }

    #[test]
    fn test_digest_is_stable() {
        let token = RefreshToken::from_client("abc");
        assert_eq!(token.digest(), RefreshToken::from_client("abc").digest());
        assert_ne!(token.digest(), RefreshToken::from_client("abd").digest());
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = RefreshToken::from_client("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }

    #[test]
    fn test_digest_from_vec() {
        assert!(RefreshTokenDigest::try_from(vec![0u8; 32]).is_ok());
        assert!(RefreshTokenDigest::try_from(vec![0u8; 31]).is_err());
    }
}
