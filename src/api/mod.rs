use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{CredentialService, ProvisioningService};
use crate::state::SharedState;

pub mod auth;
mod error;
mod ssh;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub credentials: CredentialService,

    pub provisioning: ProvisioningService,
}

impl AppState {
    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    #[must_use]
    pub const fn provisioning(&self) -> &ProvisioningService {
        &self.provisioning
    }
}

pub async fn create_app_state(shared: Arc<SharedState>) -> anyhow::Result<Arc<AppState>> {
    let config = shared.config.read().await.clone();

    let credentials = CredentialService::new(shared.store.clone());
    let provisioning = ProvisioningService::new(config.provisioning);

    Ok(Arc::new(AppState {
        shared,
        credentials,
        provisioning,
    }))
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.shared.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/request-api-key", post(auth::request_api_key))
        .route("/generate-api-key", get(auth::generate_api_key))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    api_router
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/list", get(users::list_users))
        .route("/user/info", get(users::user_info))
        .route("/ssh/generate", post(ssh::generate_ssh_key))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
