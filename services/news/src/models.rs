//! News service models

use serde::{Deserialize, Serialize};

/// Article source as reported by the news provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A news article, passed through from the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Option<ArticleSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

/// Sentiment classification of a headline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    /// Score in [-1, 1]
    pub score: f64,
    /// "positive", "negative", or "neutral"
    pub label: String,
}

impl Sentiment {
    /// Neutral fallback used when the model's answer cannot be parsed.
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            label: "neutral".to_string(),
        }
    }
}

/// A suggested deep-dive topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepDiveTopic {
    pub topic: String,
    pub description: String,
    pub keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserializes_provider_shape() {
        let json = r#"{
            "source": {"id": "the-verge", "name": "The Verge"},
            "author": "Jane Doe",
            "title": "Example headline",
            "description": "A description",
            "url": "https://example.com/a",
            "urlToImage": "https://example.com/a.jpg",
            "publishedAt": "2024-05-01T12:00:00Z",
            "content": "Body text"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.title.as_deref(), Some("Example headline"));
        assert_eq!(
            article.url_to_image.as_deref(),
            Some("https://example.com/a.jpg")
        );
        assert_eq!(
            article.source.unwrap().name.as_deref(),
            Some("The Verge")
        );
    }

    #[test]
    fn test_article_tolerates_null_fields() {
        let json = r#"{"title": "Only a title"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.author.is_none());
        assert!(article.source.is_none());
    }
}
