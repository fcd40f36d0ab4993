use kotoba_capture::{CaptureError, CaptureRequest, CaptureSession};
use kotoba_core::{Phase, StateEvent};
use kotoba_types::AppEvent;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::context::ScanContext;
use crate::events::{Completion, Session, reject};

pub const CAMERA_DENIED: &str = "Could not access camera. Please ensure permissions are granted.";

pub async fn handle_open_camera(ctx: &ScanContext, session: &mut Session) -> anyhow::Result<()> {
    if !session.apply(StateEvent::OpenCamera) {
        return reject(ctx, session.phase(), "open the camera").await;
    }

    let attempt = Uuid::new_v4();
    let cancel = CancellationToken::new();
    session.camera_attempt = Some((attempt, cancel.clone()));
    ctx.publish(session.view()).await?;

    let request = {
        let config = ctx.state.config.read().await;
        CaptureRequest::from(&config.camera)
    };
    let backend = ctx.state.camera.clone();
    let completion_tx = ctx.completion_tx.clone();

    tracing::info!("[CAMERA] Requesting {:?} camera via {}", request.facing, backend.name());
    tokio::spawn(async move {
        let result = CaptureSession::open(backend, request, cancel).await;
        // a session in an undelivered message is dropped, which releases it
        if completion_tx
            .send(Completion::CameraOpened { attempt, result })
            .await
            .is_err()
        {
            tracing::debug!("[CAMERA] Event loop gone before camera resolved");
        }
    });

    Ok(())
}

pub async fn handle_camera_opened(
    ctx: &ScanContext,
    session: &mut Session,
    attempt: Uuid,
    result: Result<CaptureSession, CaptureError>,
) -> anyhow::Result<()> {
    let current = session.phase() == Phase::Capturing
        && session
            .camera_attempt
            .as_ref()
            .is_some_and(|(id, _)| *id == attempt);

    match result {
        Ok(capture) if current => {
            session.camera_attempt = None;
            session.capture = Some(capture);
            tracing::info!("[CAMERA] Stream open, waiting for first frame");
        }
        Ok(mut capture) => {
            tracing::debug!("[CAMERA] Releasing stale camera session");
            capture.close();
        }
        Err(CaptureError::Cancelled) => {
            tracing::debug!("[CAMERA] Acquisition cancelled");
        }
        Err(e) if current => {
            tracing::warn!("[CAMERA] {}", e);
            session.camera_attempt = None;
            ctx.notice(CAMERA_DENIED).await?;
            session.apply(StateEvent::CameraFailed);
            ctx.publish(session.view()).await?;
        }
        Err(e) => {
            tracing::debug!("[CAMERA] Ignoring failure of stale attempt: {}", e);
        }
    }

    Ok(())
}

/// Refresh the preview frame and announce readiness once
pub async fn poll_camera(ctx: &ScanContext, session: &mut Session) -> anyhow::Result<()> {
    let Some(capture) = session.capture.as_mut() else {
        return Ok(());
    };

    match capture.poll() {
        Ok(true) if !session.camera_ready => {
            session.camera_ready = true;
            if let Some((width, height)) = capture.dimensions() {
                tracing::info!("[CAMERA] Ready at {}x{}", width, height);
                ctx.send(AppEvent::CameraReady { width, height }).await?;
            }
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("[CAMERA] Stream failed: {}", e);
            ctx.notice(format!("Camera stopped: {e}")).await?;
            session.apply(StateEvent::CameraFailed);
            ctx.publish(session.view()).await?;
        }
    }

    Ok(())
}
