mod gemini;
mod prompt;
mod reply;

pub use gemini::GeminiAnalyzer;
pub use prompt::{INSTRUCTION, SKIPPED_PARTICLES, response_schema};
pub use reply::parse_reply;

use kotoba_types::{AnalysisResult, ImageBuffer};

/// Message shown to the user for every analysis failure
pub const USER_FACING_ERROR: &str =
    "Analysis failed. Ensure the text is clear and contains identifiable grammar.";

/// Extracts text, translation and significant grammar from an image
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, image: &ImageBuffer) -> Result<AnalysisResult, AnalysisError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("API error: HTTP {status}")]
    Api { status: u16 },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response violates schema: {0}")]
    Schema(String),

    #[error("Analysis timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,
}

impl AnalysisError {
    /// Generic text for the user. Diagnostics stay in the log.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_ERROR
    }
}
