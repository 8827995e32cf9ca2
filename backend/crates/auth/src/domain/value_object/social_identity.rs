//! Provider-scoped external identity

use std::fmt;

use super::social_provider::SocialProvider;

/// Stable subject identifier issued by an identity provider. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subject identifier is empty")]
pub struct EmptySubject;

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptySubject> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptySubject);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// (provider, subject) pair. Two providers may reuse the same raw subject
/// string, so the pair is the identity, not the subject alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocialIdentity {
    pub provider: SocialProvider,
    pub subject: SubjectId,
}

impl SocialIdentity {
    pub fn new(provider: SocialProvider, subject: SubjectId) -> Self {
        Self { provider, subject }
    }

    /// `provider:subject`, e.g. `google:1098...`
    pub fn namespaced(&self) -> String {
        format!("{}:{}", self.provider, self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_rejects_blank() {
        assert_eq!(SubjectId::new(""), Err(EmptySubject));
        assert_eq!(SubjectId::new("   "), Err(EmptySubject));
        assert_eq!(SubjectId::new("U1234").unwrap().as_str(), "U1234");
    }

    #[test]
    fn test_namespaced_identity() {
        let google = SocialIdentity::new(SocialProvider::Google, SubjectId::new("42").unwrap());
        let line = SocialIdentity::new(SocialProvider::Line, SubjectId::new("42").unwrap());
        assert_eq!(google.namespaced(), "google:42");
        assert_ne!(google, line);
    }
}
