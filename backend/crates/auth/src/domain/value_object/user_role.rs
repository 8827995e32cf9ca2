use serde::{Deserialize, Serialize};
use std::fmt;

/// Role stored on every user. New social sign-ins start as `Citizen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Citizen,
    Officer,
    Admin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Citizen => "citizen",
            Officer => "officer",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_staff(&self) -> bool {
        matches!(self, UserRole::Officer | UserRole::Admin)
    }

    /// Parse a stored role code. Unknown codes are `None`; callers decide
    /// whether that is corruption or bad input.
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "citizen" => Some(Citizen),
            "officer" => Some(Officer),
            "admin" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("citizen"), Some(UserRole::Citizen));
        assert_eq!(UserRole::from_code("officer"), Some(UserRole::Officer));
        assert_eq!(UserRole::from_code("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("super_admin"), None);
        assert_eq!(UserRole::from_code("Admin"), None);
    }

    #[test]
    fn test_user_role_display_matches_code() {
        for role in [UserRole::Citizen, UserRole::Officer, UserRole::Admin] {
            assert_eq!(role.to_string(), role.code());
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&UserRole::Officer).unwrap();
        assert_eq!(json, r#""officer""#);
        let role: UserRole = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(role, UserRole::Admin);
        assert!(serde_json::from_str::<UserRole>(r#""root""#).is_err());
    }

    #[test]
    fn test_default_and_staff() {
        assert_eq!(UserRole::default(), UserRole::Citizen);
        assert!(!UserRole::Citizen.is_staff());
        assert!(UserRole::Officer.is_staff());
        assert!(UserRole::Admin.is_staff());
    }
}
