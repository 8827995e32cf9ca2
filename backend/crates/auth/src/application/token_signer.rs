//! Access Token Signer
//!
//! Stateless JWT issue/verify. Key material sits behind `SigningKey` so the
//! HMAC secret can later be swapped for an asymmetric key.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Key material used to sign and verify access tokens
pub trait SigningKey: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    fn key_id(&self) -> Option<&str> {
        None
    }

    fn encoding_key(&self) -> &EncodingKey;

    fn decoding_key(&self) -> &DecodingKey;
}

/// HS256 shared secret
pub struct HmacSigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    key_id: Option<String>,
}

impl HmacSigningKey {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            key_id: None,
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }
}

impl SigningKey for HmacSigningKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Access-token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issue so two tokens for the same user never collide
    pub jti: String,
}

/// Signed token plus the claims it carries
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub claims: AccessClaims,
}

/// Claims of a token that passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: UserId,
    pub role: UserRole,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Access token signer
#[derive(Clone)]
pub struct TokenSigner {
    key: Arc<dyn SigningKey>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(key: Arc<dyn SigningKey>, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    pub fn hmac(secret: &[u8], ttl: Duration) -> Self {
        Self::new(Arc::new(HmacSigningKey::new(secret)), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: &UserId, role: UserRole) -> AuthResult<SignedToken> {
        self.issue_at(user_id, role, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: &UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> AuthResult<SignedToken> {
        let iat = now.timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            role,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(self.key.algorithm());
        header.kid = self.key.key_id().map(str::to_string);

        let token = jsonwebtoken::encode(&header, &claims, self.key.encoding_key())
            .map_err(|e| AuthError::Internal(format!("failed to sign access token: {e}")))?;

        Ok(SignedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(self.key.algorithm());
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let data = jsonwebtoken::decode::<AccessClaims>(token, self.key.decoding_key(), &validation)?;
        let claims = data.claims;

        let user_id: UserId = claims.sub.parse().map_err(|_| TokenError::Malformed)?;
        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }

        Ok(VerifiedToken {
            user_id,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &self.key.algorithm())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(72 * 3600);

    fn signer(secret: &[u8]) -> TokenSigner {
        TokenSigner::hmac(secret, TTL)
    }

    #[test]
    fn test_issue_then_verify() {
        let signer = signer(b"secret-one");
        let user_id = UserId::new();

        let signed = signer.issue(&user_id, UserRole::Officer).unwrap();
        assert_eq!(signed.claims.exp - signed.claims.iat, 259_200);

        let verified = signer.verify(&signed.token).unwrap();
        assert_eq!(verified.user_id, user_id);
        assert_eq!(verified.role, UserRole::Officer);
        assert_eq!(verified.expires_at, signed.claims.exp);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let signer = signer(b"secret-one");
        let user_id = UserId::new();
        let a = signer.issue(&user_id, UserRole::Citizen).unwrap();
        let b = signer.issue(&user_id, UserRole::Citizen).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_token() {
        let signer = signer(b"secret-one");
        let issued = Utc::now() - chrono::Duration::hours(73);
        let signed = signer
            .issue_at(&UserId::new(), UserRole::Citizen, issued)
            .unwrap();
        assert_eq!(signer.verify(&signed.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_key_is_bad_signature() {
        let signed = signer(b"secret-one")
            .issue(&UserId::new(), UserRole::Citizen)
            .unwrap();
        assert_eq!(
            signer(b"secret-two").verify(&signed.token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = signer(b"secret-one");
        assert_eq!(signer.verify("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(signer.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_key_id_lands_in_header() {
        let key = HmacSigningKey::new(b"secret-one").with_key_id("k1");
        let signer = TokenSigner::new(Arc::new(key), TTL);
        let signed = signer.issue(&UserId::new(), UserRole::Admin).unwrap();
        let header = jsonwebtoken::decode_header(&signed.token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("k1"));
        assert_eq!(header.alg, Algorithm::HS256);
    }
}
