use std::time::{Duration, Instant};

use async_trait::async_trait;
use xcap::Monitor;

use crate::device::{CameraBackend, CaptureRequest, Frame, VideoStream};
use crate::error::CaptureError;

const MIN_GRAB_INTERVAL: Duration = Duration::from_millis(250);

/// Uses the primary monitor as the video source
pub struct ScreenCamera;

#[async_trait]
impl CameraBackend for ScreenCamera {
    async fn acquire(
        &self,
        _request: &CaptureRequest,
    ) -> Result<Box<dyn VideoStream>, CaptureError> {
        let monitor = tokio::task::spawn_blocking(primary_monitor)
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))??;

        Ok(Box::new(ScreenStream {
            monitor: Some(monitor),
            last_grab: None,
        }))
    }

    fn name(&self) -> &str {
        "screen"
    }
}

fn primary_monitor() -> Result<Monitor, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
    monitors
        .into_iter()
        .next()
        .ok_or_else(|| CaptureError::DeviceUnavailable("no monitor found".to_string()))
}

struct ScreenStream {
    monitor: Option<Monitor>,
    last_grab: Option<Instant>,
}

impl VideoStream for ScreenStream {
    fn poll_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let monitor = self.monitor.as_ref().ok_or(CaptureError::Closed)?;

        if self
            .last_grab
            .is_some_and(|at| at.elapsed() < MIN_GRAB_INTERVAL)
        {
            return Ok(None);
        }
        self.last_grab = Some(Instant::now());

        let image = monitor
            .capture_image()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        Ok(Some(Frame::from_rgba(
            image.width(),
            image.height(),
            image.as_raw(),
        )))
    }

    fn stop(&mut self) {
        self.monitor = None;
    }

    fn is_active(&self) -> bool {
        self.monitor.is_some()
    }
}
