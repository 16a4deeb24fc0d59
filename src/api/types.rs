use serde::{Deserialize, Serialize};

use crate::db::Role;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummaryDto {
    pub username: String,
    pub role: Role,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfoDto {
    pub username: String,
    pub name: String,
    pub role: Role,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestApiKeyRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateApiKeyRequest {
    pub email: String,
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSshKeyRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SshKeyDto {
    pub key_id: String,
    pub public_key: String,
}
