//! News service routes

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::{
    error::{NewsError, NewsResult},
    state::AppState,
};

/// Categories fetched by the multi-category endpoint
const CATEGORY_FAN_OUT: [&str; 4] = ["technology", "business", "science", "health"];

/// Query parameters for the headlines endpoint
#[derive(Deserialize)]
pub struct HeadlinesQuery {
    pub category: Option<String>,
}

/// Query parameters for the search endpoint
#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

/// Request for article summarization
#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Request for headline sentiment analysis
#[derive(Deserialize)]
pub struct SentimentRequest {
    pub headline: Option<String>,
}

/// Request for deep-dive topic suggestions
#[derive(Deserialize)]
pub struct DeepDiveRequest {
    pub articles: Option<Vec<Value>>,
}

/// Create the router for the news service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/news/headlines", get(headlines))
        .route("/api/news/search", get(search))
        .route("/api/news/categories", get(categories))
        .route("/api/news/summarize", post(summarize))
        .route("/api/news/sentiment", post(sentiment))
        .route("/api/news/deep-dive", post(deep_dive))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "news-service"
    }))
}

/// Fetch top headlines with an optional category filter
pub async fn headlines(
    State(state): State<AppState>,
    Query(query): Query<HeadlinesQuery>,
) -> NewsResult<impl IntoResponse> {
    let articles = state
        .news
        .top_headlines(query.category.as_deref(), None)
        .await
        .map_err(|e| {
            error!("Error fetching headlines: {}", e);
            NewsError::Upstream("Failed to fetch headlines")
        })?;

    Ok(Json(json!({
        "success": true,
        "count": articles.len(),
        "articles": articles,
    })))
}

/// Search for news articles
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> NewsResult<impl IntoResponse> {
    let Some(q) = query.q.filter(|q| !q.is_empty()) else {
        return Err(NewsError::BadRequest("Search query is required".to_string()));
    };

    let articles = state
        .news
        .search(&q, query.sort_by.as_deref(), None)
        .await
        .map_err(|e| {
            error!("Error searching news: {}", e);
            NewsError::Upstream("Failed to search news")
        })?;

    Ok(Json(json!({
        "success": true,
        "count": articles.len(),
        "articles": articles,
    })))
}

/// Fetch news across the fixed category set
pub async fn categories(State(state): State<AppState>) -> NewsResult<impl IntoResponse> {
    let articles = state
        .news
        .by_categories(&CATEGORY_FAN_OUT)
        .await
        .map_err(|e| {
            error!("Error fetching categorized news: {}", e);
            NewsError::Upstream("Failed to fetch categorized news")
        })?;

    Ok(Json(json!({
        "success": true,
        "count": articles.len(),
        "articles": articles,
    })))
}

/// Summarize an article
pub async fn summarize(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeRequest>,
) -> NewsResult<impl IntoResponse> {
    let (Some(title), Some(content)) = (payload.title, payload.content) else {
        return Err(NewsError::BadRequest(
            "Title and content are required".to_string(),
        ));
    };

    let summary = state.ai.summarize(&title, &content).await.map_err(|e| {
        error!("Error summarizing article: {}", e);
        NewsError::Upstream("Failed to summarize article")
    })?;

    Ok(Json(json!({
        "success": true,
        "summary": summary,
    })))
}

/// Analyze the sentiment of a headline
pub async fn sentiment(
    State(state): State<AppState>,
    Json(payload): Json<SentimentRequest>,
) -> NewsResult<impl IntoResponse> {
    let Some(headline) = payload.headline else {
        return Err(NewsError::BadRequest("Headline is required".to_string()));
    };

    // Degrades to neutral internally; this endpoint never 500s on model noise.
    let sentiment = state.ai.sentiment(&headline).await;

    Ok(Json(json!({
        "success": true,
        "sentiment": sentiment,
    })))
}

/// Suggest deep-dive topics from recent articles
pub async fn deep_dive(
    State(state): State<AppState>,
    Json(payload): Json<DeepDiveRequest>,
) -> NewsResult<impl IntoResponse> {
    let Some(articles) = payload.articles else {
        return Err(NewsError::BadRequest(
            "Articles array is required".to_string(),
        ));
    };

    // Accept either article objects or bare title strings.
    let titles: Vec<String> = articles
        .iter()
        .filter_map(|a| {
            a.get("title")
                .and_then(Value::as_str)
                .or_else(|| a.as_str())
                .map(str::to_string)
        })
        .collect();

    let topics = state.ai.suggest_topics(&titles).await;

    Ok(Json(json!({
        "success": true,
        "topics": topics,
    })))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::{ai_client::GenerativeClient, news_client::NewsApiClient};

    // Clients pointed at an unroutable host; the validation paths under
    // test never reach the network.
    fn test_state() -> AppState {
        AppState {
            news: NewsApiClient::new("http://127.0.0.1:9".to_string(), "test-key".to_string()),
            ai: GenerativeClient::new(
                "http://127.0.0.1:9".to_string(),
                "test-key".to_string(),
                "gemini-pro".to_string(),
            ),
        }
    }

    async fn send(
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = create_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (status, body) = send("GET", "/api/news/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Search query is required");

        let (status, _) = send("GET", "/api/news/search?q=", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summarize_requires_title_and_content() {
        let (status, body) = send(
            "POST",
            "/api/news/summarize",
            Some(json!({"title": "only a title"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title and content are required");
    }

    #[tokio::test]
    async fn test_sentiment_requires_headline() {
        let (status, _) = send("POST", "/api/news/sentiment", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deep_dive_requires_articles() {
        let (status, body) = send("POST", "/api/news/deep-dive", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Articles array is required");
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "news-service");
    }
}
