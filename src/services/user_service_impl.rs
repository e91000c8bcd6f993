//! Default implementation of the `UserService` trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{UserDraft, UserRepository};
use crate::domain::{NewUser, User, UserId, UserPatch};
use crate::services::cached_reader::CachedUserReader;
use crate::services::credentials::CredentialVerifier;
use crate::services::image::ProfilePictureStore;
use crate::services::token::TokenIssuer;
use crate::services::user_service::{AuthError, ProfilePicture, UserError, UserService};
use crate::services::validation::{self, ValidationError};

pub struct DefaultUserService {
    repository: Arc<dyn UserRepository>,
    reader: CachedUserReader,
    credentials: CredentialVerifier,
    tokens: TokenIssuer,
    pictures: ProfilePictureStore,
}

impl DefaultUserService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        reader: CachedUserReader,
        credentials: CredentialVerifier,
        tokens: TokenIssuer,
        pictures: ProfilePictureStore,
    ) -> Self {
        Self {
            repository,
            reader,
            credentials,
            tokens,
            pictures,
        }
    }

    /// Uncached read used by every write path.
    async fn load(&self, id: UserId) -> Result<User, UserError> {
        self.repository
            .get_user_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }
}

fn log_internal(op: &'static str, err: UserError) -> UserError {
    if let UserError::Internal(ref detail) = err {
        tracing::error!(op, error = %detail, "User operation failed");
    }
    err
}

#[async_trait]
impl UserService for DefaultUserService {
    async fn create_user(&self, input: NewUser) -> Result<User, UserError> {
        let validated = validation::validate_new_user(&input)?;

        let password_hash = self
            .credentials
            .hash(&input.password)
            .await
            .map_err(|e| log_internal("create_user", e.into()))?;

        let draft = UserDraft {
            full_name: input.full_name,
            username: input.username,
            password_hash,
            status: validated.status,
            role: validated.role,
        };

        let user = self
            .repository
            .create_user(draft)
            .await
            .map_err(|e| log_internal("create_user", e.into()))?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User, UserError> {
        self.reader
            .get_user_by_id(id)
            .await
            .map_err(|e| log_internal("get_user", e.into()))?
            .ok_or(UserError::NotFound)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository
            .get_all_users()
            .await
            .map_err(|e| log_internal("list_users", e.into()))
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, UserError> {
        let changes = validation::validate_patch(&patch)?;
        let mut user = self
            .load(id)
            .await
            .map_err(|e| log_internal("update_user", e))?;

        if let Some(full_name) = changes.full_name {
            user.full_name = full_name.to_string();
        }
        if let Some(username) = changes.username {
            user.username = username.to_string();
        }
        if let Some(password) = changes.password {
            user.password_hash = self
                .credentials
                .hash(password)
                .await
                .map_err(|e| log_internal("update_user", e.into()))?;
        }
        if let Some(status) = changes.status {
            user.status = status;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }

        let updated = self
            .repository
            .update_user(&user)
            .await
            .map_err(|e| log_internal("update_user", e.into()))?;

        tracing::info!(user_id = %id, "User updated");
        Ok(updated)
    }

    /// Issues a single DELETE. Zero affected rows is reported as
    /// `NotFound`, so no fetch precedes it.
    async fn delete_user(&self, id: UserId) -> Result<(), UserError> {
        let deleted = self
            .repository
            .delete_user(id)
            .await
            .map_err(|e| log_internal("delete_user", e.into()))?;

        if !deleted {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<String, UserError> {
        let user = self
            .repository
            .get_user_by_username(username)
            .await
            .map_err(|e| log_internal("authenticate", e.into()))?;

        let Some(user) = user else {
            tracing::warn!(username = %username, "Login failed: unknown username");
            metrics::counter!("user_login_failures_total").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.credentials.verify(password, &user.password_hash).await {
            tracing::warn!(username = %username, "Login failed: password mismatch");
            metrics::counter!("user_login_failures_total").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self
            .tokens
            .issue(&user)
            .map_err(|e| log_internal("authenticate", e.into()))?;

        tracing::info!(user_id = %user.id, "Login succeeded");
        Ok(token)
    }

    async fn update_profile_picture(
        &self,
        id: UserId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<User, UserError> {
        let name = ProfilePictureStore::sanitize_filename(filename)
            .filter(|name| ProfilePictureStore::is_image(name))
            .ok_or(ValidationError::NotAnImage)?;

        let mut user = self
            .load(id)
            .await
            .map_err(|e| log_internal("update_profile_picture", e))?;

        let stored_name = format!("{id}-{name}");
        self.pictures
            .save(&stored_name, &bytes)
            .await
            .map_err(|e| log_internal("update_profile_picture", e.into()))?;

        user.profile_picture = stored_name;
        self.repository
            .update_user(&user)
            .await
            .map_err(|e| log_internal("update_profile_picture", e.into()))
    }

    async fn profile_picture(&self, id: UserId) -> Result<ProfilePicture, UserError> {
        let user = self
            .load(id)
            .await
            .map_err(|e| log_internal("profile_picture", e))?;

        if user.profile_picture.is_empty() {
            return Err(UserError::NotFound);
        }

        let bytes = self
            .pictures
            .read(&user.profile_picture)
            .await
            .map_err(|e| log_internal("profile_picture", e.into()))?;

        Ok(ProfilePicture {
            content_type: ProfilePictureStore::content_type(&user.profile_picture),
            filename: user.profile_picture,
            bytes,
        })
    }
}
