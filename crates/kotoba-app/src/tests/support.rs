use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};
use kotoba_analyzer::{AnalysisError, Analyzer, ProviderMetadata, parse_reply};
use kotoba_capture::Frame;
use kotoba_capture::mock::ScriptedCamera;
use kotoba_config::Config;
use kotoba_types::{AnalysisResult, AppEvent, ImageBuffer, StateView};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::state::AppState;

pub const WAIT: Duration = Duration::from_secs(2);

pub const CAT_REPLY: &str = r#"{
    "originalText": "猫が好きです",
    "translation": "I like cats",
    "tokens": [
        { "surface": "好きです", "reading": "すきです", "definition": "like (polite)" }
    ]
}"#;

/// Analyzer that answers every image with the same model text
pub struct CannedAnalyzer {
    reply: String,
    delay: Duration,
    calls: AtomicUsize,
    last_image: Mutex<Option<ImageBuffer>>,
}

impl CannedAnalyzer {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_image(&self) -> Option<ImageBuffer> {
        self.last_image.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn analyze(&self, image: &ImageBuffer) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_image.lock().unwrap() = Some(image.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        parse_reply(&self.reply)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "canned".to_string(),
            model: "none".to_string(),
        }
    }
}

pub fn frame(width: u32, height: u32) -> Frame {
    Frame::new(width, height, vec![128; (width * height * 3) as usize])
}

/// Write a small PNG to a unique temp path
pub fn png_file() -> PathBuf {
    let path = std::env::temp_dir().join(format!("kotoba-upload-{}.png", uuid::Uuid::new_v4()));
    let pixels = image::RgbImage::from_pixel(12, 8, image::Rgb([250, 250, 250]));
    pixels.save(&path).unwrap();
    path
}

/// Event loop wired to in-memory channels
pub struct Harness {
    pub commands: AsyncSender<AppEvent>,
    pub output: AsyncReceiver<AppEvent>,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<anyhow::Result<()>>,
    pub camera: ScriptedCamera,
    pub analyzer: Arc<CannedAnalyzer>,
}

impl Harness {
    pub async fn start(camera: ScriptedCamera, analyzer: CannedAnalyzer) -> Self {
        let mut config = Config::default();
        config.camera.frame_poll_ms = 5;

        let analyzer = Arc::new(analyzer);
        let state = Arc::new(AppState::with_services(
            config,
            analyzer.clone(),
            Arc::new(camera.clone()),
        ));

        let (commands, commands_rx) = kanal::bounded_async(16);
        let (output_tx, output) = kanal::unbounded_async();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(event_loop(state, commands_rx, output_tx, cancel.clone()));

        let harness = Self {
            commands,
            output,
            cancel,
            handle,
            camera,
            analyzer,
        };
        assert_eq!(harness.next_state().await, StateView::Idle);
        harness
    }

    pub async fn send(&self, event: AppEvent) {
        self.commands.send(event).await.unwrap();
    }

    pub async fn next_event(&self) -> AppEvent {
        timeout(WAIT, self.output.recv())
            .await
            .expect("timed out waiting for the event loop")
            .unwrap()
    }

    /// Skip notices and readiness until the next state change
    pub async fn next_state(&self) -> StateView {
        loop {
            if let AppEvent::StateChanged(view) = self.next_event().await {
                return view;
            }
        }
    }

    pub async fn next_notice(&self) -> String {
        loop {
            if let AppEvent::Notice(message) = self.next_event().await {
                return message;
            }
        }
    }

    pub async fn wait_ready(&self) -> (u32, u32) {
        loop {
            if let AppEvent::CameraReady { width, height } = self.next_event().await {
                return (width, height);
            }
        }
    }

    /// Poll until `check` holds or the wait runs out
    pub async fn eventually(&self, check: impl Fn(&ScriptedCamera) -> bool) {
        let camera = self.camera.clone();
        timeout(WAIT, async move {
            while !check(&camera) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition never held");
    }
}
