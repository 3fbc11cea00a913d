//! Client for the upstream news provider

use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing::{error, info};

use crate::models::Article;

/// Default number of articles per request
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Provider response envelope
#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Client for the news provider's REST API
#[derive(Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    /// Create a new client from environment variables
    ///
    /// # Environment Variables
    /// - `NEWSAPI_KEY`: provider API key (required)
    /// - `NEWSAPI_BASE_URL`: provider base URL (default: "https://newsapi.org/v2")
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NEWSAPI_KEY")
            .map_err(|_| anyhow!("NEWSAPI_KEY environment variable not set"))?;
        let base_url = std::env::var("NEWSAPI_BASE_URL")
            .unwrap_or_else(|_| "https://newsapi.org/v2".to_string());

        Ok(Self::new(base_url, api_key))
    }

    /// Create a client against an explicit base URL and key.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Fetch top headlines, optionally filtered by category.
    pub async fn top_headlines(
        &self,
        category: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Vec<Article>> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).to_string();
        let mut params = vec![
            ("apiKey", self.api_key.as_str()),
            ("country", "us"),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(category) = category {
            params.push(("category", category));
        }

        let response = self
            .http
            .get(format!("{}/top-headlines", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<ArticlesResponse>()
            .await?;

        Ok(response.articles)
    }

    /// Search for articles matching a query.
    pub async fn search(
        &self,
        query: &str,
        sort_by: Option<&str>,
        from: Option<&str>,
    ) -> Result<Vec<Article>> {
        let page_size = DEFAULT_PAGE_SIZE.to_string();
        let mut params = vec![
            ("apiKey", self.api_key.as_str()),
            ("q", query),
            ("sortBy", sort_by.unwrap_or("publishedAt")),
            ("pageSize", page_size.as_str()),
            ("language", "en"),
        ];
        if let Some(from) = from {
            params.push(("from", from));
        }

        let response = self
            .http
            .get(format!("{}/everything", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<ArticlesResponse>()
            .await?;

        Ok(response.articles)
    }

    /// Fetch headlines for several categories concurrently and flatten the
    /// results. A failing category is skipped rather than failing the batch.
    pub async fn by_categories(&self, categories: &[&str]) -> Result<Vec<Article>> {
        let handles: Vec<_> = categories
            .iter()
            .map(|category| {
                let client = self.clone();
                let category = category.to_string();
                tokio::spawn(async move { client.top_headlines(Some(&category), Some(10)).await })
            })
            .collect();

        let mut articles = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(batch)) => articles.extend(batch),
                Ok(Err(e)) => error!("Category fetch failed: {}", e),
                Err(e) => error!("Category fetch task panicked: {}", e),
            }
        }

        info!("Fetched {} articles across categories", articles.len());
        Ok(articles)
    }
}
