use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use kotoba_analyzer::AnalysisError;
use kotoba_capture::{CaptureError, CaptureSession};
use kotoba_core::{ApplicationState, Phase, StateEvent};
use kotoba_types::{AnalysisResult, AppEvent, ImageSource, StateView};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::context::ScanContext;
use crate::state::AppState;

pub mod analyze;
pub mod capture_frame;
pub mod open_camera;
pub mod reset;
pub mod upload_image;

use analyze::handle_analysis_finished;
use capture_frame::{handle_cancel_capture, handle_capture_frame};
use open_camera::{handle_camera_opened, handle_open_camera, poll_camera};
use reset::handle_reset;
use upload_image::handle_upload;

/// Background work reporting back to the event loop
pub enum Completion {
    CameraOpened {
        attempt: Uuid,
        result: Result<CaptureSession, CaptureError>,
    },
    AnalysisFinished {
        scan_id: Uuid,
        result: Result<AnalysisResult, AnalysisError>,
    },
}

/// Everything the event loop owns between events
#[derive(Default)]
pub struct Session {
    state: ApplicationState,
    pub capture: Option<CaptureSession>,
    pub camera_attempt: Option<(Uuid, CancellationToken)>,
    pub camera_ready: bool,
    pub source: Option<ImageSource>,
    pub scan_id: Option<Uuid>,
}

impl Session {
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Feed the state machine. Leaving `Capturing` always releases the camera.
    pub fn apply(&mut self, event: StateEvent) -> bool {
        let from = self.state.phase();
        let transition = std::mem::take(&mut self.state).handle(event);
        let moved = transition.is_moved();
        self.state = transition.into_state();

        if moved {
            tracing::info!("[STATE] {} -> {}", from, self.state.phase());
            if self.state.phase() != Phase::Capturing {
                self.release_camera();
            }
        } else {
            tracing::debug!("[STATE] Event rejected in {}", from);
        }
        moved
    }

    /// Abort a pending acquisition and stop any open stream
    pub fn release_camera(&mut self) {
        if let Some((_, token)) = self.camera_attempt.take() {
            token.cancel();
        }
        if let Some(mut capture) = self.capture.take() {
            capture.close();
        }
        self.camera_ready = false;
    }

    pub fn view(&self) -> StateView {
        match &self.state {
            ApplicationState::Idle => StateView::Idle,
            ApplicationState::Capturing => StateView::Capturing,
            ApplicationState::Analyzing => StateView::Analyzing {
                source: self.source.clone().unwrap_or(ImageSource::Camera),
            },
            ApplicationState::Result(result) => StateView::Result(result.clone()),
            ApplicationState::Error(message) => StateView::Error(message.clone()),
        }
    }
}

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (completion_tx, completion_rx) = kanal::unbounded_async();
    let poll_every = {
        let config = state.config.read().await;
        Duration::from_millis(config.camera.frame_poll_ms.max(1))
    };
    let ctx = ScanContext::new(state, app_to_ui_tx, completion_tx);

    let mut ticker = tokio::time::interval(poll_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut session = Session::default();
    ctx.publish(session.view()).await?;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    let outcome = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break Ok(());
            }
            event = ui_to_app_rx.recv() => {
                let Ok(event) = event else {
                    tracing::info!("[EVENT_LOOP] Command channel closed");
                    break Ok(());
                };
                if matches!(event, AppEvent::Quit) {
                    tracing::info!("[EVENT_LOOP] Quit requested");
                    break Ok(());
                }
                if let Err(e) = handle_events(&ctx, &mut session, event).await {
                    break Err(e);
                }
            }
            completion = completion_rx.recv() => {
                // ctx holds a sender, so the channel stays open
                if let Ok(completion) = completion
                    && let Err(e) = handle_completion(&ctx, &mut session, completion).await
                {
                    break Err(e);
                }
            }
            _ = ticker.tick(), if session.capture.is_some() => {
                if let Err(e) = poll_camera(&ctx, &mut session).await {
                    break Err(e);
                }
            }
        }
    };

    session.release_camera();
    let _ = ctx.event_tx.send(AppEvent::Quit).await;
    outcome
}

async fn handle_events(
    ctx: &ScanContext,
    session: &mut Session,
    event: AppEvent,
) -> anyhow::Result<()> {
    tracing::debug!(
        "[EVENT_LOOP] Event {:?} in {}",
        std::mem::discriminant(&event),
        session.phase()
    );
    match event {
        AppEvent::OpenCamera => handle_open_camera(ctx, session).await?,
        AppEvent::CancelCapture => handle_cancel_capture(ctx, session).await?,
        AppEvent::CaptureFrame => handle_capture_frame(ctx, session).await?,
        AppEvent::UploadImage(path) => handle_upload(ctx, session, path).await?,
        AppEvent::Reset => handle_reset(ctx, session).await?,
        AppEvent::UiEvent(ui_event) => {
            if session.phase() == Phase::Result {
                ctx.send(AppEvent::UiEvent(ui_event)).await?;
            } else {
                reject(ctx, session.phase(), "page through results").await?;
            }
        }
        AppEvent::Quit => {
            // handled by the loop
        }
        AppEvent::StateChanged(_) | AppEvent::CameraReady { .. } | AppEvent::Notice(_) => {
            // UI-only event, ignore in backend
        }
    }

    Ok(())
}

async fn handle_completion(
    ctx: &ScanContext,
    session: &mut Session,
    completion: Completion,
) -> anyhow::Result<()> {
    match completion {
        Completion::CameraOpened { attempt, result } => {
            handle_camera_opened(ctx, session, attempt, result).await
        }
        Completion::AnalysisFinished { scan_id, result } => {
            handle_analysis_finished(ctx, session, scan_id, result).await
        }
    }
}

/// Tell the user a command does not apply right now
pub(crate) async fn reject(ctx: &ScanContext, phase: Phase, action: &str) -> anyhow::Result<()> {
    let message = match phase {
        Phase::Analyzing => format!("Cannot {action}: analysis in progress"),
        phase => format!("Cannot {action} in the {phase} state"),
    };
    tracing::debug!("[EVENT_LOOP] {}", message);
    ctx.notice(message).await
}
