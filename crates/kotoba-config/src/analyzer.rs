use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Credential for the hosted model. Usually supplied through the environment.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL, without the `/models/...` suffix
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound for one analysis call
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<set>" })
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
