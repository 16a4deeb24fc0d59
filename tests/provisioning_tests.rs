use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use keywarden::config::Config;
use std::os::unix::fs::PermissionsExt;
use tower::ServiceExt;

/// Seed API keys created by the initial migration (must match
/// m20260310_create_users.rs)
const ALICE_KEY: &str = "keywarden_seed_key_alice_rotate_me";
const TESS_KEY: &str = "keywarden_seed_key_tess_rotate_me";

async fn spawn_app_with_home_root(home_root: &str) -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.provisioning.home_root = home_root.to_string();

    let state = keywarden::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    keywarden::api::router(state).await
}

async fn post_generate(app: &Router, api_key: Option<&str>, email: &str) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/ssh/generate")
        .header("Content-Type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("API-KEY", key);
    }

    let body = serde_json::json!({ "email": email });
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn ssh_keygen_available() -> bool {
    std::process::Command::new("ssh-keygen")
        .arg("-?")
        .output()
        .is_ok()
}

#[tokio::test]
async fn test_generate_requires_auth() {
    let home = tempfile::tempdir().unwrap();
    let app = spawn_app_with_home_root(home.path().to_str().unwrap()).await;

    let response = post_generate(&app, None, "alice@ascompany.local").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_generate_refused_for_test_role() {
    let home = tempfile::tempdir().unwrap();
    std::fs::create_dir(home.path().join("alice")).unwrap();
    let app = spawn_app_with_home_root(home.path().to_str().unwrap()).await;

    // The caller's own role gates the request, even for a valid target.
    let response = post_generate(&app, Some(TESS_KEY), "alice@ascompany.local").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Role not allowed");
}

#[tokio::test]
async fn test_generate_rejects_malformed_email() {
    let home = tempfile::tempdir().unwrap();
    let app = spawn_app_with_home_root(home.path().to_str().unwrap()).await;

    let response = post_generate(&app, Some(ALICE_KEY), "not-an-email").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_generate(&app, Some(ALICE_KEY), "../escape@x.local").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_generate(&app, Some(ALICE_KEY), "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_unknown_account() {
    let home = tempfile::tempdir().unwrap();
    let app = spawn_app_with_home_root(home.path().to_str().unwrap()).await;

    let response = post_generate(&app, Some(ALICE_KEY), "ghost@ascompany.local").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_creates_keypair() {
    if !ssh_keygen_available() {
        eprintln!("ssh-keygen not available, skipping");
        return;
    }

    let home = tempfile::tempdir().unwrap();
    let account_home = home.path().join("alice");
    std::fs::create_dir(&account_home).unwrap();

    let app = spawn_app_with_home_root(home.path().to_str().unwrap()).await;

    let response = post_generate(&app, Some(ALICE_KEY), "alice@ascompany.local").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let data = &body["data"];

    let key_id = data["key_id"].as_str().unwrap();
    assert!(key_id.starts_with("id_rsa_"));

    let public_key = data["public_key"].as_str().unwrap();
    assert!(public_key.starts_with("ssh-rsa "));
    assert!(public_key.contains("alice@ascompany.local"));

    // Only the public half and the handle cross the wire.
    assert!(data.get("private_key_path").is_none());
    assert!(data.get("private_key").is_none());

    let ssh_dir = account_home.join(".ssh");
    let private_path = ssh_dir.join(key_id);
    let public_path = ssh_dir.join(format!("{key_id}.pub"));

    assert!(private_path.is_file());
    assert!(public_path.is_file());

    let mode = |p: &std::path::Path| {
        std::fs::metadata(p).unwrap().permissions().mode() & 0o777
    };
    assert_eq!(mode(&ssh_dir), 0o700);
    assert_eq!(mode(&private_path), 0o600);
    assert_eq!(mode(&public_path), 0o644);
}

#[tokio::test]
async fn test_repeated_generation_yields_distinct_keys() {
    if !ssh_keygen_available() {
        eprintln!("ssh-keygen not available, skipping");
        return;
    }

    let home = tempfile::tempdir().unwrap();
    std::fs::create_dir(home.path().join("alice")).unwrap();
    let app = spawn_app_with_home_root(home.path().to_str().unwrap()).await;

    let first = json_body(post_generate(&app, Some(ALICE_KEY), "alice@ascompany.local").await).await;
    let second =
        json_body(post_generate(&app, Some(ALICE_KEY), "alice@ascompany.local").await).await;

    assert_ne!(first["data"]["key_id"], second["data"]["key_id"]);
    assert_ne!(first["data"]["public_key"], second["data"]["public_key"]);
}
