use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod ai_client;
mod error;
mod models;
mod news_client;
mod routes;
mod state;

use crate::{ai_client::GenerativeClient, news_client::NewsApiClient, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting news service");

    let state = AppState {
        news: NewsApiClient::from_env()?,
        ai: GenerativeClient::from_env()?,
    };

    info!("News service initialized successfully");

    // Start the web server
    let app = routes::create_router(state);

    let bind_addr =
        std::env::var("NEWS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("News service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
