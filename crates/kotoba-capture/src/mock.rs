use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::device::{CameraBackend, CaptureRequest, Frame, VideoStream};
use crate::error::CaptureError;

/// Camera that replays a fixed list of frames and counts acquire/release pairs
#[derive(Clone)]
pub struct ScriptedCamera {
    frames: Vec<Frame>,
    delay: Duration,
    failure: Option<String>,
    fail_after: Option<usize>,
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            delay: Duration::ZERO,
            failure: None,
            fail_after: None,
            acquired: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new(vec![])
        }
    }

    /// Stream errors on every poll after the first `polls` succeed, like an unplugged device
    pub fn failing_after(mut self, polls: usize) -> Self {
        self.fail_after = Some(polls);
        self
    }

    /// Delay before the device resolves, like a permission prompt
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn active_streams(&self) -> usize {
        self.acquired() - self.released()
    }
}

#[async_trait]
impl CameraBackend for ScriptedCamera {
    async fn acquire(
        &self,
        _request: &CaptureRequest,
    ) -> Result<Box<dyn VideoStream>, CaptureError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(CaptureError::DeviceUnavailable(reason.clone()));
        }

        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            frames: self.frames.clone(),
            next: 0,
            fail_after: self.fail_after,
            active: true,
            released: self.released.clone(),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedStream {
    frames: Vec<Frame>,
    next: usize,
    fail_after: Option<usize>,
    active: bool,
    released: Arc<AtomicUsize>,
}

impl VideoStream for ScriptedStream {
    fn poll_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.active {
            return Err(CaptureError::Closed);
        }
        if self.fail_after.is_some_and(|polls| self.next >= polls) {
            return Err(CaptureError::DeviceUnavailable("device disconnected".to_string()));
        }
        if self.frames.is_empty() {
            self.next += 1;
            return Ok(None);
        }
        // the last frame repeats, like a still scene
        let index = self.next.min(self.frames.len() - 1);
        self.next += 1;
        Ok(Some(self.frames[index].clone()))
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
