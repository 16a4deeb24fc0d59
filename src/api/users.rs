use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, UserInfoDto, UserSummaryDto};
use crate::db::User;

/// GET /user/list
/// List all users (requires authentication)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserSummaryDto>>>, ApiError> {
    let users = state
        .store()
        .list_users()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;

    let summaries = users
        .into_iter()
        .map(|u| UserSummaryDto {
            username: u.username,
            role: u.role,
            email: u.email,
        })
        .collect();

    Ok(Json(ApiResponse::success(summaries)))
}

/// GET /user/info
/// Full profile of the calling user
pub async fn user_info(
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<UserInfoDto>>, ApiError> {
    Ok(Json(ApiResponse::success(UserInfoDto {
        username: user.username,
        name: user.name,
        role: user.role,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })))
}
