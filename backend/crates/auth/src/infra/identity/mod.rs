//! Identity provider adapters

pub mod google;
pub mod line;

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::verifier::VerifierRegistry;
use crate::error::{AuthError, AuthResult};

pub use google::GoogleVerifier;
pub use line::LineVerifier;

/// Register an adapter for every provider that has a client id configured
pub fn registry_from_config(config: &AuthConfig) -> AuthResult<VerifierRegistry> {
    let client = platform::http_client::build_client(config.provider_timeout)
        .map_err(|e| AuthError::Internal(format!("failed to build HTTP client: {e}")))?;

    let mut registry = VerifierRegistry::new();

    if let Some(client_id) = config.google_client_id.as_deref().filter(|s| !s.is_empty()) {
        registry.register(Arc::new(GoogleVerifier::new(client.clone(), client_id)));
    }

    if let Some(channel_id) = config.line_channel_id.as_deref().filter(|s| !s.is_empty()) {
        registry.register(Arc::new(LineVerifier::new(client, channel_id)));
    }

    if registry.providers().is_empty() {
        tracing::warn!("No identity providers configured; social login is disabled");
    } else {
        tracing::info!(providers = ?registry.providers(), "Identity providers registered");
    }

    Ok(registry)
}
