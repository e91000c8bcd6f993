use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::validation::validate_user_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::domain::{NewUser, UserPatch};

/// POST /users
/// Register a new account
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let user = state.users().create_user(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.users().list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/{id}
/// Served through the user cache, so the result may lag a recent update.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user_id = validate_user_id(id)?;
    let user = state.users().get_user(user_id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user_id = validate_user_id(id)?;
    let user = state.users().update_user(user_id, patch).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user_id = validate_user_id(id)?;
    state.users().delete_user(user_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("User {user_id} deleted"),
    })))
}

/// POST /users/{id}/profile-picture
/// Multipart upload; the image is read from the `file` field.
pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user_id = validate_user_id(id)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::validation("Missing multipart field 'file'"));
    };

    let user = state
        .users()
        .update_profile_picture(user_id, &filename, bytes.to_vec())
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

pub async fn get_profile_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let user_id = validate_user_id(id)?;
    let picture = state.users().profile_picture(user_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, picture.content_type),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        picture.bytes,
    )
        .into_response())
}
