//! Identity Verification
//!
//! Provider adapters sit behind `IdentityVerifier`; the registry dispatches on
//! the provider name and rejects unknown names before any network call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_object::{
    social_identity::{SocialIdentity, SubjectId},
    social_provider::SocialProvider,
};

/// Verification failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Provider name unknown or not configured
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The provider rejected the credential
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The provider could not be reached or answered unusably
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Validates a provider-issued credential and returns its subject
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    fn provider(&self) -> SocialProvider;

    async fn verify(&self, credential: &str) -> Result<SubjectId, VerifyError>;
}

/// Provider name -> adapter
#[derive(Clone, Default)]
pub struct VerifierRegistry {
    verifiers: HashMap<SocialProvider, Arc<dyn IdentityVerifier>>,
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own provider, replacing any previous one
    pub fn register(&mut self, verifier: Arc<dyn IdentityVerifier>) {
        self.verifiers.insert(verifier.provider(), verifier);
    }

    pub fn with(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.register(verifier);
        self
    }

    pub fn is_registered(&self, provider: SocialProvider) -> bool {
        self.verifiers.contains_key(&provider)
    }

    pub fn providers(&self) -> Vec<SocialProvider> {
        SocialProvider::ALL
            .into_iter()
            .filter(|p| self.is_registered(*p))
            .collect()
    }

    pub async fn verify(
        &self,
        provider: &str,
        credential: &str,
    ) -> Result<SocialIdentity, VerifyError> {
        let provider: SocialProvider = provider
            .parse()
            .map_err(|_| VerifyError::UnsupportedProvider(provider.to_string()))?;

        let verifier = self
            .verifiers
            .get(&provider)
            .ok_or_else(|| VerifyError::UnsupportedProvider(provider.to_string()))?;

        if credential.trim().is_empty() {
            return Err(VerifyError::InvalidCredential("empty credential".to_string()));
        }

        let subject = verifier.verify(credential).await?;

        tracing::debug!(provider = %provider, "Social credential verified");

        Ok(SocialIdentity::new(provider, subject))
    }
}
