use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

mod config;
mod csrf;
mod error;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod state;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool};

use crate::{
    config::{AuthConfig, StorageBackend},
    repositories::{MemoryStore, PreferenceRepository, SessionRepository, UserRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

    let config = AuthConfig::from_env()?;

    let state = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            AppState {
                users: Arc::new(UserRepository::new(pool.clone())),
                sessions: Arc::new(SessionRepository::new(pool.clone())),
                preferences: Arc::new(PreferenceRepository::new(pool)),
                config: config.clone(),
            }
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all users and sessions are lost on restart");
            let store = Arc::new(MemoryStore::new());
            AppState {
                users: store.clone(),
                sessions: store.clone(),
                preferences: store,
                config: config.clone(),
            }
        }
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Authentication service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
