//! User accounts.

use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// A user as returned by the backend's "who am I" endpoint.
///
/// The application only ever holds a read-only copy of this record; the
/// backend owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Whether the user gets the restaurant creation tools.
    #[must_use]
    pub const fn is_chef(&self) -> bool {
        self.role.is_chef()
    }

    /// Whether this user owns the record with the given owner reference.
    #[must_use]
    pub fn owns(&self, owner_id: Option<&UserId>) -> bool {
        owner_id.is_some_and(|owner| *owner == self.id)
    }
}

/// Signup payload for a new user.
///
/// The password is supplied separately so this type never carries a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_user() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "name": "Chef Mario", "email": "chef@example.com", "role": "chef"}"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId::from(1));
        assert!(user.is_chef());
    }

    #[test]
    fn test_missing_role_means_customer() {
        let user: User = serde_json::from_str(r#"{"id": "u1", "name": "Ana"}"#).unwrap();
        assert_eq!(user.role, Role::Customer);
        assert!(user.email.is_empty());
    }

    #[test]
    fn test_owns_compares_ids() {
        let user = User {
            id: UserId::from(7),
            name: "Ana".to_string(),
            email: String::new(),
            role: Role::Chef,
        };
        assert!(user.owns(Some(&UserId::new("7"))));
        assert!(!user.owns(Some(&UserId::new("8"))));
        assert!(!user.owns(None));
    }
}
