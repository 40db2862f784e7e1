mod config;
mod db;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use clap::Parser;

use crate::config::ServerConfig;
use crate::services::google::GoogleAuthority;
use crate::store::{MemoryProfileStore, PgProfileStore, ProfileStore};

#[derive(Parser, Debug)]
#[command(name = "account-server", about = "Profile backend for the account page")]
struct Cli {
    /// Environment name (loads `.<NAME>.env`) or path to a dotenv file.
    #[arg(short, long, env = "ACCOUNT_ENVIRONMENT", default_value = "prod")]
    environment: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let env_file = config::env_file_path(&cli.environment);
    let env_loaded = dotenvy::from_path(&env_file);

    tracing_subscriber::fmt::init();

    if let Err(e) = env_loaded {
        tracing::warn!(path = %env_file.display(), error = %e, "env file not loaded");
    }

    let config = ServerConfig::from_env().expect("invalid server configuration");

    let store: Arc<dyn ProfileStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            Arc::new(PgProfileStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory profile store");
            Arc::new(MemoryProfileStore::new())
        }
    };

    if config.google.client_secret.is_none() {
        tracing::warn!("GOOGLE_CLIENT_SECRET not set; tokenRefresh disabled");
    }
    let authority = Arc::new(GoogleAuthority::new(config.google.clone()));

    let state = state::AppState::new(store, authority, config.bundle_dir.clone());
    let app = routes::app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, environment = %cli.environment, "account server listening");
    axum::serve(listener, app).await.expect("server failed");
}
