use std::sync::Arc;

use kotoba_types::ImageBuffer;
use tokio_util::sync::CancellationToken;

use crate::device::{CameraBackend, CaptureRequest, Frame, VideoStream};
use crate::encode::encode_jpeg;
use crate::error::CaptureError;

/// Exclusive hold on an open camera.
///
/// The stream is stopped by `close()` or, failing that, when the session is
/// dropped, so every way out of the capturing phase releases the device.
pub struct CaptureSession {
    stream: Option<Box<dyn VideoStream>>,
    latest: Option<Frame>,
    jpeg_quality: u8,
}

impl CaptureSession {
    /// Acquire a device from `backend`.
    ///
    /// If `cancel` fires before the device resolves, returns `Cancelled` and
    /// stops the stream as soon as the pending acquisition completes.
    pub async fn open(
        backend: Arc<dyn CameraBackend>,
        request: CaptureRequest,
        cancel: CancellationToken,
    ) -> Result<Self, CaptureError> {
        let jpeg_quality = request.jpeg_quality;
        let backend_name = backend.name().to_string();

        let mut acquire = tokio::spawn(async move { backend.acquire(&request).await });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tokio::spawn(async move {
                    if let Ok(Ok(mut stream)) = acquire.await {
                        tracing::debug!("Releasing camera that resolved after cancellation");
                        stream.stop();
                    }
                });
                Err(CaptureError::Cancelled)
            }
            joined = &mut acquire => {
                match joined {
                    Ok(Ok(stream)) => {
                        tracing::info!("Camera acquired via {}", backend_name);
                        Ok(Self::from_stream(stream, jpeg_quality))
                    }
                    Ok(Err(e)) => Err(e.into_unavailable()),
                    Err(e) => Err(CaptureError::DeviceUnavailable(format!(
                        "camera task failed: {e}"
                    ))),
                }
            }
        }
    }

    pub fn from_stream(stream: Box<dyn VideoStream>, jpeg_quality: u8) -> Self {
        Self {
            stream: Some(stream),
            latest: None,
            jpeg_quality,
        }
    }

    /// Pull the newest frame into the preview slot. Returns readiness.
    pub fn poll(&mut self) -> Result<bool, CaptureError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::Closed)?;
        if let Some(frame) = stream.poll_frame()?
            && frame.has_dimensions()
        {
            self.latest = Some(frame);
        }
        Ok(self.is_ready())
    }

    /// True once a frame with known, non-zero dimensions has arrived
    pub fn is_ready(&self) -> bool {
        self.stream.is_some() && self.latest.as_ref().is_some_and(Frame::has_dimensions)
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.latest.as_ref().map(|f| (f.width, f.height))
    }

    /// Encode the current preview frame. The stream keeps running.
    pub fn capture_frame(&self) -> Result<ImageBuffer, CaptureError> {
        if self.stream.is_none() {
            return Err(CaptureError::Closed);
        }
        match &self.latest {
            Some(frame) if frame.has_dimensions() => encode_jpeg(frame, self.jpeg_quality),
            _ => Err(CaptureError::NotReady),
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop all tracks and release the device
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("Camera released");
        }
        self.latest = None;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}
