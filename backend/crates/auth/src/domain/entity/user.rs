//! User Entity
//!
//! Local account resolved from a social identity.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Role carried into access-token claims
    pub user_role: UserRole,
    /// Name shown in clients; empty until the user sets one
    pub display_name: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user for a first-time social sign-in
    pub fn new() -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_role: UserRole::default(),
            display_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update user role
    pub fn set_role(&mut self, role: UserRole) {
        self.user_role = role;
        self.updated_at = Utc::now();
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_citizen() {
        let user = User::new();
        assert_eq!(user.user_role, UserRole::Citizen);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_set_role_touches_updated_at() {
        let mut user = User::new();
        let before = user.updated_at;
        user.set_role(UserRole::Officer);
        assert_eq!(user.user_role, UserRole::Officer);
        assert!(user.updated_at >= before);
    }
}
