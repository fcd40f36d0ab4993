use serde::{Deserialize, Serialize};

use self::analyzer::AnalyzerConfig;
use self::camera::CameraConfig;
use self::ui::UiConfig;

pub mod analyzer;
pub mod camera;
pub mod ui;

pub use camera::CameraFacing;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Apply environment-style overrides from `lookup`.
    ///
    /// Values that fail to parse are ignored and the existing value is kept.
    /// A zero timeout, from either source, falls back to the default.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY"))
            && !key.trim().is_empty()
        {
            self.analyzer.api_key = key.trim().to_string();
        }

        if let Some(model) = lookup("KOTOBA_MODEL") {
            self.analyzer.model = model;
        }

        if let Some(url) = lookup("KOTOBA_API_URL") {
            self.analyzer.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = lookup("TIMEOUT_SECONDS").and_then(|v| v.parse::<u64>().ok())
            && timeout > 0
        {
            self.analyzer.timeout_seconds = timeout;
        }
        if self.analyzer.timeout_seconds == 0 {
            self.analyzer.timeout_seconds = AnalyzerConfig::default().timeout_seconds;
        }

        if let Some(quality) = lookup("JPEG_QUALITY").and_then(|v| v.parse::<u8>().ok()) {
            self.camera.jpeg_quality = quality;
        }
        self.camera.jpeg_quality = self.camera.jpeg_quality.clamp(1, 100);

        if let Some(index) = lookup("CAMERA_INDEX").and_then(|v| v.parse().ok()) {
            self.camera.device_index = index;
        }

        if let Some(poll) = lookup("FRAME_POLL_MS").and_then(|v| v.parse().ok()) {
            self.camera.frame_poll_ms = poll;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.analyzer.model, "gemini-3-flash-preview");
        assert_eq!(config.analyzer.timeout_seconds, 30);
        assert_eq!(config.camera.jpeg_quality, 80);
        assert_eq!(config.camera.facing, CameraFacing::Environment);
        assert!(!config.ui.original_expanded);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_overrides(lookup(&[
            ("API_KEY", "fallback"),
            ("GEMINI_API_KEY", " primary "),
            ("KOTOBA_API_URL", "http://127.0.0.1:9000/v1/"),
            ("TIMEOUT_SECONDS", "5"),
            ("CAMERA_INDEX", "2"),
        ]));

        assert_eq!(config.analyzer.api_key, "primary");
        assert_eq!(config.analyzer.api_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.analyzer.timeout_seconds, 5);
        assert_eq!(config.camera.device_index, 2);
    }

    #[test]
    fn test_api_key_fallback_and_bad_values() {
        let config = Config::default().with_overrides(lookup(&[
            ("API_KEY", "fallback"),
            ("TIMEOUT_SECONDS", "soon"),
            ("JPEG_QUALITY", "0"),
        ]));

        assert_eq!(config.analyzer.api_key, "fallback");
        assert_eq!(config.analyzer.timeout_seconds, 30);
        assert_eq!(config.camera.jpeg_quality, 1);
    }

    #[test]
    fn test_zero_timeout_keeps_a_usable_value() {
        let config = Config::default().with_overrides(lookup(&[("TIMEOUT_SECONDS", "0")]));
        assert_eq!(config.analyzer.timeout_seconds, 30);

        let mut profile = Config::default();
        profile.analyzer.timeout_seconds = 0;
        let config = profile.with_overrides(lookup(&[]));
        assert_eq!(config.analyzer.timeout_seconds, 30);

        let mut profile = Config::default();
        profile.analyzer.timeout_seconds = 0;
        let config = profile.with_overrides(lookup(&[("TIMEOUT_SECONDS", "12")]));
        assert_eq!(config.analyzer.timeout_seconds, 12);
    }

    #[test]
    fn test_partial_json_profile() {
        let config: Config =
            serde_json::from_str(r#"{ "camera": { "facing": "user" }, "ui": { "original_expanded": true } }"#)
                .unwrap();

        assert_eq!(config.camera.facing, CameraFacing::User);
        assert_eq!(config.camera.jpeg_quality, 80);
        assert!(config.ui.original_expanded);
        assert_eq!(config.analyzer.timeout_seconds, 30);
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.analyzer.api_key = "secret".to_string();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
