//! Google ID token verification
//!
//! Checks the RS256 signature against Google's published JWKS, plus issuer,
//! audience and expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::value_object::{social_identity::SubjectId, social_provider::SocialProvider};
use crate::domain::verifier::{IdentityVerifier, VerifyError};

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Unknown `kid`s trigger at most one JWKS refetch per interval
const JWKS_MIN_REFETCH: Duration = Duration::from_secs(60);
/// Clock skew allowed on `exp`/`nbf`
const LEEWAY_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    kid: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    jwks_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleVerifier {
    pub fn new(client: reqwest::Client, client_id: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            cache: RwLock::new(None),
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = LEEWAY_SECS;
        validation
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < JWKS_CACHE_TTL
                    && let Some(key) = cached.keys.get(kid)
                {
                    return Ok(key.clone());
                }
                if age < JWKS_MIN_REFETCH {
                    return Err(unknown_kid(kid));
                }
            }
        }

        // Unknown kid or stale cache: Google may have rotated keys
        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();
        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| unknown_kid(kid))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, VerifyError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerifyError::ProviderUnavailable(format!("google jwks: {e}")))?;

        if !response.status().is_success() {
            return Err(VerifyError::ProviderUnavailable(format!(
                "google jwks returned {}",
                response.status()
            )));
        }

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| VerifyError::ProviderUnavailable(format!("google jwks body: {e}")))?;

        let keys = jwks_to_keys(jwks);
        tracing::debug!(keys = keys.len(), "Google signing keys refreshed");
        Ok(keys)
    }
}

fn unknown_kid(kid: &str) -> VerifyError {
    VerifyError::InvalidCredential(format!("unknown signing key: {kid}"))
}

fn jwks_to_keys(jwks: Jwks) -> HashMap<String, DecodingKey> {
    jwks.keys
        .into_iter()
        .filter(|k| k.kty == "RSA")
        .filter_map(|k| {
            let (kid, n, e) = (k.kid?, k.n?, k.e?);
            match DecodingKey::from_rsa_components(&n, &e) {
                Ok(key) => Some((kid, key)),
                Err(err) => {
                    tracing::warn!(kid = %kid, error = %err, "Skipping unusable Google JWK");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Google
    }

    async fn verify(&self, credential: &str) -> Result<SubjectId, VerifyError> {
        let header = jsonwebtoken::decode_header(credential)
            .map_err(|e| VerifyError::InvalidCredential(format!("malformed id token: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::InvalidCredential(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidCredential("id token has no kid".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let data = jsonwebtoken::decode::<GoogleClaims>(credential, &key, &self.validation())
            .map_err(|e| VerifyError::InvalidCredential(e.to_string()))?;

        SubjectId::new(data.claims.sub)
            .map_err(|_| VerifyError::InvalidCredential("id token has empty sub".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn verifier() -> GoogleVerifier {
        // Unroutable URL: any attempt to fetch keys fails fast
        GoogleVerifier::new(reqwest::Client::new(), "client-id")
            .with_jwks_url("http://127.0.0.1:9/certs")
    }

    fn unsigned_token(header: &str, payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[tokio::test]
    async fn test_garbage_is_invalid_credential() {
        let err = verifier().verify("not-a-token").await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_hmac_token_rejected_before_key_fetch() {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "1", "exp": 4_102_444_800u64 }),
            &jsonwebtoken::EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_missing_kid_rejected() {
        let token = unsigned_token(r#"{"alg":"RS256","typ":"JWT"}"#, r#"{"sub":"1"}"#);
        let err = verifier().verify(&token).await.unwrap_err();
        assert_eq!(
            err,
            VerifyError::InvalidCredential("id token has no kid".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_jwks_is_provider_unavailable() {
        let token = unsigned_token(r#"{"alg":"RS256","kid":"k1"}"#, r#"{"sub":"1"}"#);
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::ProviderUnavailable(_)));
    }

    async fn seed_cache(verifier: &GoogleVerifier, age: Duration) {
        *verifier.cache.write().await = Some(CachedKeys {
            keys: HashMap::new(),
            fetched_at: Instant::now() - age,
        });
    }

    #[tokio::test]
    async fn test_unknown_kid_within_refetch_interval_skips_fetch() {
        let verifier = verifier();
        seed_cache(&verifier, Duration::from_secs(5)).await;

        // a fetch would hit the unroutable URL and report ProviderUnavailable
        for kid in ["forged-1", "forged-2", "forged-3"] {
            let header = format!(r#"{{"alg":"RS256","kid":"{kid}"}}"#);
            let token = unsigned_token(&header, r#"{"sub":"1"}"#);
            let err = verifier.verify(&token).await.unwrap_err();
            assert_eq!(err, unknown_kid(kid));
        }
    }

    #[tokio::test]
    async fn test_unknown_kid_after_refetch_interval_refetches() {
        let verifier = verifier();
        seed_cache(&verifier, JWKS_MIN_REFETCH + Duration::from_secs(1)).await;

        let token = unsigned_token(r#"{"alg":"RS256","kid":"rotated"}"#, r#"{"sub":"1"}"#);
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_jwks_skips_non_rsa_keys() {
        let jwks: Jwks = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kty": "EC", "kid": "ec1", "crv": "P-256", "x": "a", "y": "b" },
                { "kty": "RSA", "kid": "rsa-no-modulus", "e": "AQAB" }
            ]
        }))
        .unwrap();
        assert!(jwks_to_keys(jwks).is_empty());
    }
}
