use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Rear camera
    Environment,
    /// Front camera
    User,
}

fn default_facing() -> CameraFacing {
    CameraFacing::Environment
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_frame_poll_ms() -> u64 {
    33
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(default = "default_facing")]
    pub facing: CameraFacing,
    /// Index of the device to open when more than one is present
    #[serde(default)]
    pub device_index: u32,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// How often the preview pulls a frame from the stream
    #[serde(default = "default_frame_poll_ms")]
    pub frame_poll_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: default_facing(),
            device_index: 0,
            width: None,
            height: None,
            jpeg_quality: default_jpeg_quality(),
            frame_poll_ms: default_frame_poll_ms(),
        }
    }
}
