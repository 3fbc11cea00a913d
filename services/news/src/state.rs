//! Application state shared across handlers

use crate::{ai_client::GenerativeClient, news_client::NewsApiClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub news: NewsApiClient,
    pub ai: GenerativeClient,
}
