use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use async_trait::async_trait;
use kotoba_config::CameraFacing;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::{Camera, query};
use tokio::sync::oneshot;

use crate::device::{CameraBackend, CaptureRequest, Frame, VideoStream};
use crate::error::CaptureError;

/// Webcam backed by the platform camera API.
///
/// `nokhwa::Camera` is not `Send` on every platform, so the camera lives on a
/// dedicated thread that publishes the newest frame into a shared slot.
pub struct NativeCamera;

#[async_trait]
impl CameraBackend for NativeCamera {
    async fn acquire(
        &self,
        request: &CaptureRequest,
    ) -> Result<Box<dyn VideoStream>, CaptureError> {
        let index = select_device(request)?;
        let slot: Arc<Mutex<Option<Frame>>> = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let (opened_tx, opened_rx) = oneshot::channel::<Result<(), String>>();

        let worker = {
            let slot = slot.clone();
            let running = running.clone();
            std::thread::Builder::new()
                .name("kotoba-camera".to_string())
                .spawn(move || camera_thread(index, slot, running, opened_tx))?
        };

        match opened_rx.await {
            Ok(Ok(())) => Ok(Box::new(NativeStream {
                slot,
                running,
                worker: Some(worker),
            })),
            Ok(Err(reason)) => {
                let _ = worker.join();
                Err(CaptureError::DeviceUnavailable(reason))
            }
            Err(_) => Err(CaptureError::DeviceUnavailable(
                "camera thread exited before opening".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "native"
    }
}

/// Desktop cameras rarely report which way they face; prefer a device whose
/// name says so and fall back to the configured index.
fn select_device(request: &CaptureRequest) -> Result<CameraIndex, CaptureError> {
    let devices = query(ApiBackend::Auto)
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    if devices.is_empty() {
        return Err(CaptureError::DeviceUnavailable("no camera found".to_string()));
    }

    let hints: &[&str] = match request.facing {
        CameraFacing::Environment => &["back", "rear", "environment"],
        CameraFacing::User => &["front", "user", "facetime"],
    };

    let by_name = devices.iter().find(|info| {
        let name = info.human_name().to_lowercase();
        hints.iter().any(|hint| name.contains(hint))
    });

    Ok(match by_name {
        Some(info) => info.index().clone(),
        None => CameraIndex::Index(request.device_index),
    })
}

fn camera_thread(
    index: CameraIndex,
    slot: Arc<Mutex<Option<Frame>>>,
    running: Arc<AtomicBool>,
    opened_tx: oneshot::Sender<Result<(), String>>,
) {
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
    let mut camera = match Camera::new(index, requested).and_then(|mut camera| {
        camera.open_stream()?;
        Ok(camera)
    }) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = opened_tx.send(Err(e.to_string()));
            return;
        }
    };

    if opened_tx.send(Ok(())).is_err() {
        // nobody is waiting any more
        let _ = camera.stop_stream();
        return;
    }

    while running.load(Ordering::Acquire) {
        match camera.frame().and_then(|buffer| buffer.decode_image::<RgbFormat>()) {
            Ok(image) => {
                let frame = Frame::new(image.width(), image.height(), image.into_raw());
                if let Ok(mut guard) = slot.lock() {
                    *guard = Some(frame);
                }
            }
            Err(e) => {
                tracing::warn!("Camera frame error: {}", e);
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        tracing::warn!("Failed to stop camera stream: {}", e);
    }
}

struct NativeStream {
    slot: Arc<Mutex<Option<Frame>>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl VideoStream for NativeStream {
    fn poll_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.is_active() {
            return Err(CaptureError::Closed);
        }
        Ok(self.slot.lock().ok().and_then(|mut guard| guard.take()))
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn is_active(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_drop_stops_camera_thread() {
        let running = Arc::new(AtomicBool::new(true));
        let exited = Arc::new(AtomicBool::new(false));
        let worker = {
            let running = running.clone();
            let exited = exited.clone();
            std::thread::spawn(move || {
                while running.load(Ordering::Acquire) {
                    std::thread::sleep(Duration::from_millis(1));
                }
                exited.store(true, Ordering::Release);
            })
        };

        let stream: Box<dyn VideoStream> = Box::new(NativeStream {
            slot: Arc::new(Mutex::new(None)),
            running: running.clone(),
            worker: Some(worker),
        });
        drop(stream);

        assert!(!running.load(Ordering::Acquire));
        assert!(exited.load(Ordering::Acquire));
    }
}
