use kotoba_capture::{CaptureError, CaptureSession};
use kotoba_core::{Phase, StateEvent};
use kotoba_types::ImageSource;

use crate::context::ScanContext;
use crate::events::analyze::submit_image;
use crate::events::{Session, reject};

pub async fn handle_capture_frame(ctx: &ScanContext, session: &mut Session) -> anyhow::Result<()> {
    if session.phase() != Phase::Capturing {
        return reject(ctx, session.phase(), "snap a photo").await;
    }

    let image = match session.capture.as_ref().map(CaptureSession::capture_frame) {
        Some(Ok(image)) => image,
        None | Some(Err(CaptureError::NotReady)) => {
            return ctx.notice("Camera is not ready yet").await;
        }
        Some(Err(e)) => {
            tracing::warn!("[CAMERA] Capture failed: {}", e);
            return ctx.notice(format!("Capture failed: {e}")).await;
        }
    };

    tracing::info!(
        "[CAMERA] Captured {} bytes ({}x{})",
        image.len(),
        image.width.unwrap_or(0),
        image.height.unwrap_or(0)
    );
    submit_image(ctx, session, image, ImageSource::Camera).await
}

pub async fn handle_cancel_capture(ctx: &ScanContext, session: &mut Session) -> anyhow::Result<()> {
    if !session.apply(StateEvent::CancelCapture) {
        return reject(ctx, session.phase(), "cancel capture").await;
    }
    ctx.publish(session.view()).await
}
