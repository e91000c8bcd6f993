use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginRequest, LoginResponse};
use crate::services::TokenError;

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>` with a valid, unexpired token.
///
/// On success the decoded [`crate::services::Claims`] are added to the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::unauthorized());
    };

    match state.shared.tokens.verify(token) {
        Ok(claims) => {
            tracing::Span::current().record("user_id", claims.sub.as_str());
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(TokenError::MissingSecret) => {
            Err(ApiError::internal("Token signing secret is not configured"))
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            Err(ApiError::unauthorized())
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with username and password, returns a bearer token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let token = state
        .users()
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse { token })))
}
