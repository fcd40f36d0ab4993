use kotoba_core::StateEvent;

use crate::context::ScanContext;
use crate::events::{Session, reject};

pub async fn handle_reset(ctx: &ScanContext, session: &mut Session) -> anyhow::Result<()> {
    if !session.apply(StateEvent::Reset) {
        return reject(ctx, session.phase(), "start a new scan").await;
    }
    session.source = None;
    ctx.publish(session.view()).await
}
