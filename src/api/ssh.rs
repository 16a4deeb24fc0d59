use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, GenerateSshKeyRequest, SshKeyDto};
use crate::db::{Role, User};

/// POST /ssh/generate
/// Provision an SSH keypair for the account derived from the target email.
/// Authorization reads the calling user's role, never the target record.
pub async fn generate_ssh_key(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<User>,
    Json(payload): Json<GenerateSshKeyRequest>,
) -> Result<Json<ApiResponse<SshKeyDto>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    if caller.role == Role::Test {
        return Err(ApiError::forbidden("Role not allowed"));
    }

    let key = state.provisioning().generate_keypair(&payload.email).await?;

    Ok(Json(ApiResponse::success(SshKeyDto {
        key_id: key.key_id,
        public_key: key.public_key,
    })))
}
