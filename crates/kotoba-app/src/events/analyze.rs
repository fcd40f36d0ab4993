use kotoba_analyzer::AnalysisError;
use kotoba_core::{Phase, StateEvent};
use kotoba_types::{AnalysisResult, ImageBuffer, ImageSource};
use tracing::Instrument;
use uuid::Uuid;

use crate::context::ScanContext;
use crate::events::{Completion, Session, reject};

/// Move to `Analyzing` and run the analyzer in the background
pub async fn submit_image(
    ctx: &ScanContext,
    session: &mut Session,
    image: ImageBuffer,
    source: ImageSource,
) -> anyhow::Result<()> {
    if !session.apply(StateEvent::ImageSubmitted) {
        return reject(ctx, session.phase(), "analyze an image").await;
    }

    let scan_id = Uuid::new_v4();
    session.scan_id = Some(scan_id);
    session.source = Some(source.clone());
    ctx.publish(session.view()).await?;

    let analyzer = ctx.state.analyzer.clone();
    let completion_tx = ctx.completion_tx.clone();
    let span = tracing::info_span!("scan", id = %scan_id, source = %source);

    tokio::spawn(
        async move {
            tracing::info!("[ANALYZE] Sending {} bytes", image.len());
            let result = analyzer.analyze(&image).await;
            if completion_tx
                .send(Completion::AnalysisFinished { scan_id, result })
                .await
                .is_err()
            {
                tracing::debug!("[ANALYZE] Event loop gone before analysis finished");
            }
        }
        .instrument(span),
    );

    Ok(())
}

pub async fn handle_analysis_finished(
    ctx: &ScanContext,
    session: &mut Session,
    scan_id: Uuid,
    result: Result<AnalysisResult, AnalysisError>,
) -> anyhow::Result<()> {
    if session.phase() != Phase::Analyzing || session.scan_id != Some(scan_id) {
        tracing::debug!("[ANALYZE] Dropping result of stale scan {}", scan_id);
        return Ok(());
    }
    session.scan_id = None;

    let event = match result {
        Ok(result) => {
            tracing::info!(scan = %scan_id, "[ANALYZE] {} grammar items", result.tokens.len());
            StateEvent::AnalysisSucceeded(result)
        }
        Err(e) => {
            tracing::error!(scan = %scan_id, "[ANALYZE] {}", e);
            StateEvent::AnalysisFailed(e.user_message().to_string())
        }
    };

    session.apply(event);
    ctx.publish(session.view()).await
}
