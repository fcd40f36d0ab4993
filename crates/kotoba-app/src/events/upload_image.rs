use std::path::PathBuf;

use kotoba_capture::load_image_file;
use kotoba_core::Phase;
use kotoba_types::ImageSource;

use crate::context::ScanContext;
use crate::events::analyze::submit_image;
use crate::events::{Session, reject};

pub async fn handle_upload(
    ctx: &ScanContext,
    session: &mut Session,
    path: PathBuf,
) -> anyhow::Result<()> {
    if session.phase() != Phase::Idle {
        return reject(ctx, session.phase(), "upload an image").await;
    }

    match load_image_file(&path).await {
        Ok(image) => {
            tracing::info!("[UPLOAD] {} ({}, {} bytes)", path.display(), image.mime.as_str(), image.len());
            submit_image(ctx, session, image, ImageSource::Upload(path)).await
        }
        Err(e) => {
            tracing::warn!("[UPLOAD] {}: {}", path.display(), e);
            ctx.notice(format!("Could not read {}: {e}", path.display()))
                .await
        }
    }
}
