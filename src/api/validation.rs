use super::ApiError;
use crate::domain::UserId;

pub fn validate_user_id(id: i32) -> Result<UserId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(UserId::new(id))
}
