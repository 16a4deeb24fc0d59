use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use super::{
    ApiError, ApiKeyResponse, ApiResponse, AppState, GenerateApiKeyRequest, MessageResponse,
    RequestApiKeyRequest,
};
use crate::constants::API_KEY_HEADER;

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware: resolves the `API-KEY` header to a user and
/// attaches it to the request extensions for downstream handlers.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(api_key) = extract_api_key(&headers) else {
        return Err(ApiError::forbidden("Missing API-KEY header"));
    };

    let user = state
        .credentials()
        .authenticate(&api_key)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?
        .ok_or_else(|| ApiError::forbidden("Invalid API key"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extract the bearer token from the `API-KEY` header
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(API_KEY_HEADER)?;
    let token = value.to_str().ok()?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /request-api-key
/// Issue a one-time PIN for the account matching the supplied email
pub async fn request_api_key(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RequestApiKeyRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let issued = state
        .credentials()
        .request_pin(&payload.email)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to issue PIN: {e}")))?;

    if !issued {
        return Err(ApiError::not_found("No account matches that email"));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "One-time PIN issued".to_string(),
    })))
}

/// GET /generate-api-key
/// Redeem a one-time PIN for a fresh API key. Reads a JSON body.
pub async fn generate_api_key(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateApiKeyRequest>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.pin.is_empty() {
        return Err(ApiError::validation("PIN is required"));
    }

    let new_key = state
        .credentials()
        .redeem_pin(&payload.email, &payload.pin)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to redeem PIN: {e}")))?
        .ok_or_else(|| ApiError::forbidden("Invalid email or PIN"))?;

    Ok(Json(ApiResponse::success(ApiKeyResponse {
        api_key: new_key,
    })))
}
