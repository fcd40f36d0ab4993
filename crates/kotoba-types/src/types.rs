use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Open the camera and start a capture session
    OpenCamera,
    /// Abandon the capture session and go back to idle
    CancelCapture,
    /// Take a frame from the running capture session
    CaptureFrame,
    /// Analyze an image from local storage
    UploadImage(PathBuf),
    /// Discard the current result or error
    Reset,
    UiEvent(UiEvent),
    Quit,

    // Backend -> UI
    StateChanged(StateView),
    CameraReady {
        width: u32,
        height: u32,
    },
    Notice(String),
}

/// Interactions scoped to a displayed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    NextPage,
    PrevPage,
    ToggleOriginal,
}

/// What the UI needs to draw the current state
#[derive(Debug, Clone, PartialEq)]
pub enum StateView {
    Idle,
    Capturing,
    Analyzing { source: ImageSource },
    Result(AnalysisResult),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Upload(PathBuf),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Upload(path) => write!(f, "upload:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
            ImageMime::Gif => "image/gif",
        }
    }
}

/// Encoded image handed to the analyzer.
///
/// `bytes` hold the encoded file exactly as produced by the encoder or read
/// from disk. Dimensions are known for camera frames and for uploads that
/// decode cleanly.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub bytes: Vec<u8>,
    pub mime: ImageMime,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageBuffer {
    pub fn new(bytes: Vec<u8>, mime: ImageMime) -> Self {
        Self {
            bytes,
            mime,
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// One significant grammatical component, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarToken {
    pub surface: String,
    pub reading: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub original_text: String,
    pub translation: String,
    pub tokens: Vec<GrammarToken>,
}

/// Why a parsed reply cannot be shown as a result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidResult {
    #[error("originalText is empty")]
    EmptyOriginalText,
    #[error("translation is empty")]
    EmptyTranslation,
    #[error("tokens[{index}].surface is empty")]
    EmptySurface { index: usize },
    #[error("tokens[{index}].definition is empty")]
    EmptyDefinition { index: usize },
}

impl AnalysisResult {
    /// Check the invariants a successful analysis must hold.
    /// An empty token list is valid.
    pub fn validate(&self) -> Result<(), InvalidResult> {
        if self.original_text.trim().is_empty() {
            return Err(InvalidResult::EmptyOriginalText);
        }
        if self.translation.trim().is_empty() {
            return Err(InvalidResult::EmptyTranslation);
        }
        for (index, token) in self.tokens.iter().enumerate() {
            if token.surface.trim().is_empty() {
                return Err(InvalidResult::EmptySurface { index });
            }
            if token.definition.trim().is_empty() {
                return Err(InvalidResult::EmptyDefinition { index });
            }
        }
        Ok(())
    }
}
