//! Client for the generative text service
//!
//! Wraps the provider's `generateContent` REST endpoint. Structured answers
//! (sentiment, topics) are requested as JSON inside the completion text and
//! extracted defensively, falling back to neutral/empty values when the
//! model strays from the format.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::models::{DeepDiveTopic, Sentiment};

/// Completion response shape
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Client for the generative text provider
#[derive(Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenerativeClient {
    /// Create a new client from environment variables
    ///
    /// # Environment Variables
    /// - `GEMINI_API_KEY`: provider API key (required)
    /// - `GEMINI_BASE_URL`: provider base URL
    ///   (default: "https://generativelanguage.googleapis.com/v1beta")
    /// - `GEMINI_MODEL`: model name (default: "gemini-pro")
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;
        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string());

        Ok(Self::new(base_url, api_key, model))
    }

    /// Create a client against an explicit base URL, key, and model.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("Empty completion from generative service"))?;

        Ok(text)
    }

    /// Summarize an article in a few sentences.
    pub async fn summarize(&self, title: &str, content: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following news article in 2-3 concise sentences:\n\n\
             Title: {title}\n\
             Content: {content}\n\n\
             Provide a clear, informative summary that captures the key points."
        );

        Ok(self.generate(&prompt).await?.trim().to_string())
    }

    /// Classify the sentiment of a headline.
    ///
    /// Parse failures and provider errors degrade to neutral rather than
    /// failing the request.
    pub async fn sentiment(&self, headline: &str) -> Sentiment {
        let prompt = format!(
            "Analyze the sentiment of this news headline and respond with ONLY a JSON object \
             in this exact format:\n\
             {{\"score\": <number between -1 and 1>, \"label\": \"<positive|negative|neutral>\"}}\n\n\
             Headline: {headline}\n\n\
             Score guidelines:\n\
             - 0.5 to 1.0: positive\n\
             - -0.5 to 0.5: neutral\n\
             - -1.0 to -0.5: negative"
        );

        match self.generate(&prompt).await {
            Ok(text) => parse_sentiment(&text).unwrap_or_else(|| {
                warn!("Could not parse sentiment from completion");
                Sentiment::neutral()
            }),
            Err(e) => {
                warn!("Sentiment analysis failed: {}", e);
                Sentiment::neutral()
            }
        }
    }

    /// Suggest deep-dive topics from a batch of headlines.
    ///
    /// Returns an empty list when the provider fails or the answer cannot
    /// be parsed.
    pub async fn suggest_topics(&self, titles: &[String]) -> Vec<DeepDiveTopic> {
        let joined = titles
            .iter()
            .take(10)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Based on these recent news headlines, suggest 5 interesting \"deep dive\" topics \
             for further exploration. Return ONLY a JSON array of objects in this exact format:\n\
             [{{\"topic\": \"Topic Name\", \"description\": \"Brief description\", \
             \"keywords\": [\"keyword1\", \"keyword2\", \"keyword3\"]}}]\n\n\
             Headlines:\n{joined}\n\n\
             Provide diverse, thought-provoking topics that connect multiple themes from the news."
        );

        match self.generate(&prompt).await {
            Ok(text) => {
                let topics = parse_topics(&text);
                if topics.is_empty() {
                    debug!("No topics parsed from completion");
                }
                topics
            }
            Err(e) => {
                warn!("Topic suggestion failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Pull the first JSON object out of free-form completion text.
fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    serde_json::from_str(&text[start..=end]).ok()
}

/// Pull the first JSON array out of free-form completion text.
fn extract_json_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    serde_json::from_str(&text[start..=end]).ok()
}

fn parse_sentiment(text: &str) -> Option<Sentiment> {
    let value = extract_json_object(text)?;
    let score = value.get("score")?.as_f64()?.clamp(-1.0, 1.0);
    let label = value.get("label")?.as_str()?.to_lowercase();

    Some(Sentiment {
        score: (score * 100.0).round() / 100.0,
        label,
    })
}

fn parse_topics(text: &str) -> Vec<DeepDiveTopic> {
    let Some(value) = extract_json_array(text) else {
        return Vec::new();
    };
    let topics: Vec<DeepDiveTopic> = serde_json::from_value(value).unwrap_or_default();
    topics.into_iter().take(5).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentiment_from_clean_json() {
        let sentiment = parse_sentiment(r#"{"score": 0.8, "label": "Positive"}"#).unwrap();
        assert_eq!(sentiment.score, 0.8);
        assert_eq!(sentiment.label, "positive");
    }

    #[test]
    fn test_parse_sentiment_from_wrapped_text() {
        let text = "Sure! Here is the analysis:\n```json\n{\"score\": -0.651, \"label\": \"negative\"}\n```";
        let sentiment = parse_sentiment(text).unwrap();
        assert_eq!(sentiment.score, -0.65);
        assert_eq!(sentiment.label, "negative");
    }

    #[test]
    fn test_parse_sentiment_clamps_out_of_range_scores() {
        let high = parse_sentiment(r#"{"score": 7, "label": "positive"}"#).unwrap();
        assert_eq!(high.score, 1.0);

        let low = parse_sentiment(r#"{"score": -3.2, "label": "negative"}"#).unwrap();
        assert_eq!(low.score, -1.0);
    }

    #[test]
    fn test_parse_sentiment_garbage_falls_through() {
        assert!(parse_sentiment("no json here at all").is_none());
        assert!(parse_sentiment(r#"{"label": "positive"}"#).is_none());
    }

    #[test]
    fn test_parse_topics_caps_at_five() {
        let items: Vec<Value> = (0..7)
            .map(|i| {
                json!({
                    "topic": format!("Topic {i}"),
                    "description": "d",
                    "keywords": ["a", "b"],
                })
            })
            .collect();
        let text = serde_json::to_string(&items).unwrap();

        let topics = parse_topics(&text);
        assert_eq!(topics.len(), 5);
        assert_eq!(topics[0].topic, "Topic 0");
        assert_eq!(topics[0].keywords, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_topics_from_wrapped_text() {
        let text = "Here are some ideas:\n[{\"topic\": \"AI\", \"description\": \"x\", \"keywords\": []}]\nEnjoy!";
        let topics = parse_topics(text);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].topic, "AI");
    }

    #[test]
    fn test_parse_topics_malformed_yields_empty() {
        assert!(parse_topics("nothing useful").is_empty());
        assert!(parse_topics("[{\"broken\": true}]").is_empty());
    }
}
