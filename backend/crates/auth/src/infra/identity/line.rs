//! LINE ID token verification
//!
//! LINE verifies its own tokens: POST the token and our channel id to the
//! verify endpoint and read back the subject.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::value_object::{social_identity::SubjectId, social_provider::SocialProvider};
use crate::domain::verifier::{IdentityVerifier, VerifyError};

pub const LINE_VERIFY_URL: &str = "https://api.line.me/oauth2/v2.1/verify";

#[derive(Debug, Deserialize)]
struct LineVerifyResponse {
    #[serde(default)]
    sub: String,
}

pub struct LineVerifier {
    client: reqwest::Client,
    channel_id: String,
    verify_url: String,
}

impl LineVerifier {
    pub fn new(client: reqwest::Client, channel_id: impl Into<String>) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
            verify_url: LINE_VERIFY_URL.to_string(),
        }
    }

    pub fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.verify_url = url.into();
        self
    }
}

/// 5xx and 429 mean LINE is struggling; anything else is a rejected token
fn classify_status(status: StatusCode, body: &str) -> VerifyError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        VerifyError::ProviderUnavailable(format!("line verify returned {status}"))
    } else {
        VerifyError::InvalidCredential(format!("line rejected id token ({status}): {body}"))
    }
}

#[async_trait]
impl IdentityVerifier for LineVerifier {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Line
    }

    async fn verify(&self, credential: &str) -> Result<SubjectId, VerifyError> {
        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("id_token", credential), ("client_id", self.channel_id.as_str())])
            .send()
            .await
            .map_err(|e| VerifyError::ProviderUnavailable(format!("line verify: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: LineVerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::ProviderUnavailable(format!("line verify body: {e}")))?;

        SubjectId::new(body.sub)
            .map_err(|_| VerifyError::InvalidCredential("line id token has empty sub".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "invalid id_token"),
            VerifyError::InvalidCredential(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, ""),
            VerifyError::InvalidCredential(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, ""),
            VerifyError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            VerifyError::ProviderUnavailable(_)
        ));
    }

    #[test]
    fn test_missing_sub_defaults_empty() {
        let body: LineVerifyResponse = serde_json::from_str(r#"{"iss":"https://access.line.me"}"#).unwrap();
        assert!(SubjectId::new(body.sub).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_unavailable() {
        let verifier = LineVerifier::new(reqwest::Client::new(), "channel")
            .with_verify_url("http://127.0.0.1:9/verify");
        let err = verifier.verify("token").await.unwrap_err();
        assert!(matches!(err, VerifyError::ProviderUnavailable(_)));
    }
}
