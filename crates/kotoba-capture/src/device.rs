use async_trait::async_trait;
use kotoba_config::CameraFacing;
use kotoba_config::camera::CameraConfig;

use crate::error::CaptureError;

/// Single decoded video frame, tightly packed RGB8
#[derive(Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self { width, height, rgb }
    }

    /// Build from RGBA8 pixels, dropping alpha
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let rgb = rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self { width, height, rgb }
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{}, {} bytes)", self.width, self.height, self.rgb.len())
    }
}

/// Parameters for acquiring a camera
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub facing: CameraFacing,
    pub device_index: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub jpeg_quality: u8,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl From<&CameraConfig> for CaptureRequest {
    fn from(config: &CameraConfig) -> Self {
        Self {
            facing: config.facing,
            device_index: config.device_index,
            width: config.width,
            height: config.height,
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
        }
    }
}

/// A running video stream owned by one capture session
pub trait VideoStream: Send {
    /// Latest frame if a new one is available. Never blocks for long.
    fn poll_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Stop all tracks and release the device. Must be idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// Source of video streams
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Request access to a device and start streaming
    async fn acquire(&self, request: &CaptureRequest)
    -> Result<Box<dyn VideoStream>, CaptureError>;

    fn name(&self) -> &str;
}

/// Backend used when no camera support is compiled in
pub struct UnavailableCamera;

#[async_trait]
impl CameraBackend for UnavailableCamera {
    async fn acquire(
        &self,
        _request: &CaptureRequest,
    ) -> Result<Box<dyn VideoStream>, CaptureError> {
        Err(CaptureError::DeviceUnavailable(
            "no camera backend is available in this build".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
