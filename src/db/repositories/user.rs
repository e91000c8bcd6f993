use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use thiserror::Error;

use crate::domain::{User, UserId, UserRole, UserStatus};
use crate::entities::users;

/// Classified failures of the user store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("username is already taken")]
    UsernameTaken,

    #[error("user row no longer exists")]
    Missing,

    #[error("corrupt user row {id}: {reason}")]
    Corrupt { id: i32, reason: String },

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return Self::UsernameTaken;
        }
        if matches!(err, DbErr::RecordNotUpdated) {
            return Self::Missing;
        }
        Self::Database(err)
    }
}

/// Fields of a user that does not exist in the store yet.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub status: UserStatus,
    pub role: UserRole,
}

/// Durable-store access for accounts.
///
/// Implementations must be safe for concurrent use; every method is a single
/// store round trip and no transaction spans more than one call.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, draft: UserDraft) -> Result<User, RepositoryError>;

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn get_user_by_username(&self, username: &str)
    -> Result<Option<User>, RepositoryError>;

    async fn get_all_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Persists every mutable field of `user` and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Missing`] if the row was deleted meanwhile.
    async fn update_user(&self, user: &User) -> Result<User, RepositoryError>;

    /// Returns `false` when no row with that id existed.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;
}

impl TryFrom<users::Model> for User {
    type Error = RepositoryError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| RepositoryError::Corrupt {
            id: model.id,
            reason,
        };
        let status = model
            .status
            .parse::<UserStatus>()
            .map_err(|e| corrupt(e.to_string()))?;
        let role = model
            .role
            .parse::<UserRole>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Self {
            id: UserId::new(model.id),
            full_name: model.full_name,
            username: model.username,
            password_hash: model.password_hash,
            status,
            role,
            profile_picture: model.profile_picture,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub struct SeaOrmUserRepository {
    conn: DatabaseConnection,
}

impl SeaOrmUserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create_user(&self, draft: UserDraft) -> Result<User, RepositoryError> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            full_name: Set(draft.full_name),
            username: Set(draft.username),
            password_hash: Set(draft.password_hash),
            status: Set(draft.status.as_str().to_string()),
            role: Set(draft.role.as_str().to_string()),
            profile_picture: Set(String::new()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        User::try_from(model)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_all_users(&self) -> Result<Vec<User>, RepositoryError> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let active = users::ActiveModel {
            id: Set(user.id.value()),
            full_name: Set(user.full_name.clone()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            status: Set(user.status.as_str().to_string()),
            role: Set(user.role.as_str().to_string()),
            profile_picture: Set(user.profile_picture.clone()),
            created_at: Set(user.created_at.clone()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let model = active.update(&self.conn).await?;
        User::try_from(model)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = users::Entity::delete_by_id(id.value())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
