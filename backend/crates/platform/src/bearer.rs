//! Bearer token extraction
//!
//! Reads `Authorization: Bearer <token>` from request headers.

use http::{HeaderMap, header};

const BEARER_PREFIX: &str = "Bearer ";

/// Error when extracting a bearer token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not a Bearer credential")]
    NotBearer,
}

/// Extract the bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively; the token itself must be
/// non-empty.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(BearerError::MissingHeader)?;

    let prefix = value.get(..BEARER_PREFIX.len()).ok_or(BearerError::NotBearer)?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(BearerError::NotBearer);
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        return Err(BearerError::NotBearer);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let headers = headers_with("bearer abc");
        assert_eq!(extract_bearer_token(&headers), Ok("abc"));
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_bearer_token(&headers),
            Err(BearerError::MissingHeader)
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(
            extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(BearerError::NotBearer)
        );
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer ")),
            Err(BearerError::NotBearer)
        );
        assert_eq!(
            extract_bearer_token(&headers_with("Bear")),
            Err(BearerError::NotBearer)
        );
    }
}
