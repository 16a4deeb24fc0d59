pub mod api;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod lookup;
pub mod services;
pub mod state;

use tokio::signal;

pub use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "daemon" | "-d" | "--daemon" => run_server(config).await,

        "lookup" => run_lookup(config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Keywarden - User Management & SSH Provisioning API");
    println!();
    println!("USAGE:");
    println!("  keywarden <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("  serve             Run the user-management API server");
    println!("  lookup            Run the static user-lookup service");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("ENDPOINTS (serve):");
    println!("  GET  /user/list          List users (API-KEY header required)");
    println!("  GET  /user/info          Profile of the calling user");
    println!("  POST /request-api-key    Request a one-time PIN by email");
    println!("  GET  /generate-api-key   Redeem a PIN for a fresh API key");
    println!("  POST /ssh/generate       Provision an SSH keypair");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure ports, database and provisioning.");
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!(
        "Keywarden v{} starting in server mode...",
        env!("CARGO_PKG_VERSION")
    );

    let port = config.server.port;
    let state = api::create_app_state_from_config(config).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("User management API running at http://0.0.0.0:{port}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn run_lookup(config: Config) -> anyhow::Result<()> {
    info!(
        "Keywarden v{} starting in lookup mode...",
        env!("CARGO_PKG_VERSION")
    );

    let port = config.lookup.port;
    let app = lookup::router();

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("User lookup API running at http://0.0.0.0:{port}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Lookup service running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Lookup service stopped");

    Ok(())
}
