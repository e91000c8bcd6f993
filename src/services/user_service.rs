//! Domain service for account management and authentication.
//!
//! Handles registration, cached reads, partial updates, deletion, credential
//! checks with token issuance, and profile pictures.

use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::domain::{NewUser, User, UserId, UserPatch, UserRole, UserStatus};
use crate::services::credentials::CredentialError;
use crate::services::token::TokenError;
use crate::services::validation::ValidationError;

/// Authentication failures.
///
/// Unknown usernames and wrong passwords both map to the same variant so
/// callers cannot probe which usernames exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store, hashing, signing or file-system failure. The detail is meant for
    /// logs, not for API responses.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UsernameTaken => Self::Validation(ValidationError::UsernameTaken),
            RepositoryError::Missing => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CredentialError> for UserError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for UserError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// User DTO for responses. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
    pub status: UserStatus,
    pub role: UserRole,
    pub profile_picture: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            status: user.status,
            role: user.role,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Stored picture bytes and their MIME type.
#[derive(Debug, Clone)]
pub struct ProfilePicture {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Validates, hashes the password and persists a new account.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] naming the first violated rule.
    async fn create_user(&self, input: NewUser) -> Result<User, UserError>;

    /// Reads through the cache. May return a snapshot up to one TTL old.
    async fn get_user(&self, id: UserId) -> Result<User, UserError>;

    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Applies the non-empty fields of `patch` to the latest stored row.
    /// Cached snapshots are left untouched.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, UserError>;

    /// Deletes the account. Cached snapshots are left untouched.
    async fn delete_user(&self, id: UserId) -> Result<(), UserError>;

    /// Verifies credentials and returns a signed bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username or a
    /// wrong password, and [`UserError::Internal`] if signing fails.
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, UserError>;

    async fn update_profile_picture(
        &self,
        id: UserId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<User, UserError>;

    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the user or their picture is missing.
    async fn profile_picture(&self, id: UserId) -> Result<ProfilePicture, UserError>;
}
