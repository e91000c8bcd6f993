use serde::{Deserialize, Serialize};
use std::fmt;

use super::{UserId, UserRole, UserStatus};

/// An account record as held by the store.
///
/// `password_hash` is a PHC string. The plaintext password is never part of
/// this type, so neither the cache snapshot nor any log of a `User` can leak it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub status: UserStatus,
    pub role: UserRole,
    /// Stored filename of the uploaded picture, empty when none was uploaded.
    pub profile_picture: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Serializes the snapshot stored as a cache value.
    ///
    /// Field order is fixed by the struct definition, so the same user always
    /// produces the same bytes.
    pub fn to_cache_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_cache_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Input for account creation.
///
/// `status` and `role` arrive as text and are parsed during validation, so an
/// unknown value is reported as a validation failure instead of a decode error.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub status: String,
    pub role: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("full_name", &self.full_name)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("status", &self.status)
            .field("role", &self.role)
            .finish()
    }
}

/// Partial update. Absent or empty fields leave the stored value unchanged.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
}

impl UserPatch {
    /// Returns the field only when it carries a non-empty value.
    pub(crate) fn present(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|v| !v.is_empty())
    }
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("full_name", &self.full_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("status", &self.status)
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(3),
            full_name: "Alice Liddell".to_string(),
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
            status: UserStatus::Active,
            role: UserRole::Operator,
            profile_picture: String::new(),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn cache_snapshot_round_trips() {
        let user = sample_user();
        let bytes = user.to_cache_bytes().unwrap();
        let restored = User::from_cache_bytes(&bytes).unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn cache_snapshot_is_stable() {
        let user = sample_user();
        assert_eq!(user.to_cache_bytes().unwrap(), user.to_cache_bytes().unwrap());
    }

    #[test]
    fn cache_snapshot_rejects_unknown_role() {
        let mut value = serde_json::to_value(sample_user()).unwrap();
        value["role"] = serde_json::json!("Root");
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(User::from_cache_bytes(&bytes).is_err());
    }

    #[test]
    fn debug_output_hides_plaintext_password() {
        let input = NewUser {
            full_name: "Alice".to_string(),
            username: "alice".to_string(),
            password: "correctpass".to_string(),
            status: "Active".to_string(),
            role: "Admin".to_string(),
        };
        let rendered = format!("{input:?}");
        assert!(!rendered.contains("correctpass"));
        assert!(rendered.contains("[redacted]"));

        let patch = UserPatch {
            password: Some("newsecret1".to_string()),
            ..UserPatch::default()
        };
        assert!(!format!("{patch:?}").contains("newsecret1"));
    }

    #[test]
    fn patch_treats_empty_as_absent() {
        assert_eq!(UserPatch::present(&Some(String::new())), None);
        assert_eq!(UserPatch::present(&None), None);
        assert_eq!(UserPatch::present(&Some("bob".to_string())), Some("bob"));
    }
}
