use std::fmt;
use std::str::FromStr;

/// Identity providers accepted for social sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialProvider {
    Google,
    Line,
}

/// Provider name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported provider: {0}")]
pub struct UnknownProvider(pub String);

impl SocialProvider {
    pub const ALL: [SocialProvider; 2] = [SocialProvider::Google, SocialProvider::Line];

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Line => "line",
        }
    }
}

impl FromStr for SocialProvider {
    type Err = UnknownProvider;

    /// Provider names are matched exactly, as clients send them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(SocialProvider::Google),
            "line" => Ok(SocialProvider::Line),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_providers() {
        for provider in SocialProvider::ALL {
            assert_eq!(provider.as_str().parse::<SocialProvider>(), Ok(provider));
        }
    }

    #[test]
    fn test_parse_unknown_provider() {
        assert_eq!(
            "facebook".parse::<SocialProvider>(),
            Err(UnknownProvider("facebook".to_string()))
        );
        assert!("Google".parse::<SocialProvider>().is_err());
        assert!("".parse::<SocialProvider>().is_err());
    }
}
