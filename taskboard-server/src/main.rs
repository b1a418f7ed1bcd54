//! `TaskBoard` API server -- session-authenticated task tracking.
//!
//! # Usage
//!
//! ```bash
//! # Run on the default address 0.0.0.0:3000
//! cargo run --bin taskboard-server
//!
//! # Custom address and a seeded admin account
//! cargo run --bin taskboard-server -- --bind 127.0.0.1:8080 \
//!     --admin-email root@example.com --admin-password hunter22
//!
//! # Or via environment variables
//! ADMIN_EMAIL=root@example.com ADMIN_PASSWORD=hunter22 cargo run --bin taskboard-server
//! ```

use clap::Parser;

use taskboard_server::config::{ServerCliArgs, ServerConfig};
use taskboard_server::http::{self, AppState};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskboard server");

    let state = AppState::in_memory(config.session_ttl_secs);

    // Idempotent admin bootstrap, driven entirely by configuration.
    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            match state.users.seed_admin(email, password).await {
                Ok(true) => tracing::info!(email = %email, "admin user created"),
                Ok(false) => tracing::info!(email = %email, "admin user exists, seed skipped"),
                Err(e) => {
                    tracing::error!(error = %e, "admin seed failed");
                    std::process::exit(1);
                }
            }
        }
        _ => tracing::info!("admin email/password not configured, skipping admin seed"),
    }

    match http::start_server(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "taskboard server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
