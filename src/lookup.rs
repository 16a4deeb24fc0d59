//! The toy user-lookup service: a fixed record set served read-only.

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LookupRecord {
    pub role: &'static str,
    pub message: &'static str,
}

const RECORDS: &[(&str, LookupRecord)] = &[
    (
        "test",
        LookupRecord {
            role: "test",
            message: "This is a test user",
        },
    ),
    (
        "dev",
        LookupRecord {
            role: "dev",
            message: "This is a developer user",
        },
    ),
    (
        "admin",
        LookupRecord {
            role: "admin",
            message: "This is an admin user",
        },
    ),
];

#[must_use]
pub fn find_record(username: &str) -> Option<LookupRecord> {
    RECORDS
        .iter()
        .find(|(name, _)| *name == username)
        .map(|(_, record)| *record)
}

#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/user/{username}", get(get_user))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "Hello, this is a simple user lookup API!"
}

async fn get_user(Path(username): Path<String>) -> Response {
    match find_record(&username) {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "User not found" })),
        )
            .into_response(),
    }
}
