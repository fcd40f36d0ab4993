use std::sync::Arc;

use kotoba_analyzer::{Analyzer, GeminiAnalyzer};
use kotoba_capture::CameraBackend;
use kotoba_config::Config;
use tokio::sync::RwLock;

pub struct AppState {
    pub config: RwLock<Config>,
    pub analyzer: Arc<dyn Analyzer>,
    pub camera: Arc<dyn CameraBackend>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        if config.analyzer.api_key.is_empty() {
            tracing::warn!("No API key configured (GEMINI_API_KEY); every analysis will fail");
        }

        let analyzer = Arc::new(GeminiAnalyzer::from_config(&config.analyzer));
        let provider = analyzer.metadata();
        tracing::info!("Analyzer: {} ({})", provider.name, provider.model);

        let camera = kotoba_capture::default_backend();
        tracing::info!("Camera backend: {}", camera.name());

        Self::with_services(config, analyzer, camera)
    }

    pub fn with_services(
        config: Config,
        analyzer: Arc<dyn Analyzer>,
        camera: Arc<dyn CameraBackend>,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            analyzer,
            camera,
        }
    }
}
