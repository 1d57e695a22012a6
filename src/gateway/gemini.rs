//! Gemini REST client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::normalize::normalize_json;
use super::service::{transform_prompt, AiService, EXTRACTION_PROMPT};
use crate::detect::PDF_MIME_TYPE;
use crate::error::{Error, Result};
use crate::model::AnalysisResult;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; a missing key fails the first call, not construction
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Base URL of the REST API
    pub endpoint: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the API key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the `generateContent` method for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// [`AiService`] backed by the Gemini `generateContent` API.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a client.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// The active configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredential)
    }

    async fn generate(&self, body: &Value) -> Result<String> {
        let key = self.api_key()?;
        let url = self.config.generate_url();
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Service(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&text)
            )));
        }
        response_text(&text)
    }
}

#[async_trait]
impl AiService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, document: &[u8]) -> Result<AnalysisResult> {
        let body = analyze_request(document);
        let text = self.generate(&body).await?;
        if text.trim().is_empty() {
            return Err(Error::MalformedResponse("No response text".to_string()));
        }
        AnalysisResult::from_json(&normalize_json(&text))
    }

    async fn transform(&self, text: &str, instruction: &str) -> Result<String> {
        let body = transform_request(text, instruction);
        self.generate(&body).await
    }
}

/// Request body for the extraction call.
pub(crate) fn analyze_request(document: &[u8]) -> Value {
    let chart_items = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "value": { "type": "NUMBER" }
            },
            "required": ["name", "value"]
        }
    });

    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": PDF_MIME_TYPE,
                        "data": STANDARD.encode(document)
                    }
                },
                { "text": EXTRACTION_PROMPT }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "fullText": { "type": "STRING" },
                    "summary": { "type": "STRING" },
                    "sentimentScore": { "type": "NUMBER" },
                    "sentimentLabel": { "type": "STRING" },
                    "keywords": chart_items.clone(),
                    "topics": chart_items,
                    "entityCount": { "type": "NUMBER" },
                    "readingTimeMin": { "type": "NUMBER" }
                },
                "required": [
                    "fullText", "summary", "sentimentScore", "sentimentLabel",
                    "keywords", "topics", "entityCount", "readingTimeMin"
                ]
            }
        }
    })
}

/// Request body for a transformation call.
pub(crate) fn transform_request(text: &str, instruction: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": transform_prompt(text, instruction) }]
        }]
    })
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
///
/// A response without candidates yields an empty string.
pub(crate) fn response_text(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))?;
    Ok(response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url() {
        let config = GeminiConfig::new().with_endpoint("http://localhost:8080/v1/");
        assert_eq!(
            config.generate_url(),
            "http://localhost:8080/v1/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_analyze_request_shape() {
        let body = analyze_request(b"%PDF-1.4");
        let inline = &body["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "application/pdf");
        assert_eq!(inline["data"], "JVBERi0xLjQ=");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"]
                .as_array()
                .map(Vec::len),
            Some(8)
        );
    }

    #[test]
    fn test_transform_request_shape() {
        let body = transform_request("abc", "Improve this text.");
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Context text: abc"));
        assert!(text.ends_with("Output only the result."));
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        assert_eq!(response_text(body).unwrap(), "Hello");
        assert_eq!(response_text(r#"{"candidates":[]}"#).unwrap(), "");
        assert!(matches!(
            response_text("not json"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"error":{"code":403,"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = GeminiClient::new(GeminiConfig::new()).unwrap();
        let err = client.transform("text", "Improve this text.").await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }
}
