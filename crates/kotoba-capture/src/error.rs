#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Camera has not delivered a frame yet")]
    NotReady,

    #[error("Camera request was cancelled")]
    Cancelled,

    #[error("Capture session is closed")]
    Closed,

    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Not a supported image: {0}")]
    UnsupportedImage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CaptureError {
    /// Every way of failing to obtain a device collapses into `DeviceUnavailable`
    pub(crate) fn into_unavailable(self) -> Self {
        match self {
            CaptureError::DeviceUnavailable(_) => self,
            other => CaptureError::DeviceUnavailable(other.to_string()),
        }
    }
}
