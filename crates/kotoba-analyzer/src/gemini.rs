use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kotoba_config::analyzer::AnalyzerConfig;
use kotoba_types::{AnalysisResult, ImageBuffer};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::prompt::{INSTRUCTION, response_schema};
use crate::reply::parse_reply;
use crate::{AnalysisError, Analyzer, ProviderMetadata};

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiAnalyzer {
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            timeout,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.api_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    /// Request payload: the image, the fixed instruction and the reply schema
    pub fn request_body(&self, image: &ImageBuffer) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": image.mime.as_str(),
                            "data": STANDARD.encode(&image.bytes),
                        }
                    },
                    { "text": INSTRUCTION }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        })
    }

    async fn generate(&self, image: &ImageBuffer) -> Result<AnalysisResult, AnalysisError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(image))
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            return Err(AnalysisError::RateLimitExceeded);
        }

        if status == 401 || status == 403 {
            return Err(AnalysisError::AuthenticationError);
        }

        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let reply: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(reason) = reply
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!("Model blocked the request: {}", reason);
        }

        let text = reply.text().ok_or(AnalysisError::EmptyResponse)?;
        parse_reply(&text)
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, image: &ImageBuffer) -> Result<AnalysisResult, AnalysisError> {
        if self.api_key.is_empty() {
            return Err(AnalysisError::AuthenticationError);
        }

        tracing::info!(
            "Sending {} bytes ({}) to {}",
            image.len(),
            image.mime.as_str(),
            self.model
        );
        let started = Instant::now();

        let result = tokio::time::timeout(self.timeout, self.generate(image))
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout))?;

        match &result {
            Ok(analysis) => tracing::info!(
                "Analysis finished in {:?}: {} chars, {} tokens",
                started.elapsed(),
                analysis.original_text.chars().count(),
                analysis.tokens.len()
            ),
            Err(e) => tracing::warn!("Analysis failed after {:?}: {}", started.elapsed(), e),
        }

        result
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Gemini".to_string(),
            model: self.model.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined in order
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }
}
