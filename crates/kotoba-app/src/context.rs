use std::sync::Arc;

use kanal::AsyncSender;
use kotoba_types::{AppEvent, StateView};

use crate::events::Completion;
use crate::state::AppState;

/// Shared handles for event handlers and the tasks they spawn
#[derive(Clone)]
pub struct ScanContext {
    pub state: Arc<AppState>,
    pub event_tx: AsyncSender<AppEvent>,
    pub completion_tx: AsyncSender<Completion>,
}

impl ScanContext {
    pub fn new(
        state: Arc<AppState>,
        event_tx: AsyncSender<AppEvent>,
        completion_tx: AsyncSender<Completion>,
    ) -> Self {
        Self {
            state,
            event_tx,
            completion_tx,
        }
    }

    pub async fn send(&self, event: AppEvent) -> anyhow::Result<()> {
        self.event_tx.send(event).await?;
        Ok(())
    }

    pub async fn notice(&self, message: impl Into<String>) -> anyhow::Result<()> {
        self.send(AppEvent::Notice(message.into())).await
    }

    /// Tell the UI about the session's current state
    pub async fn publish(&self, view: StateView) -> anyhow::Result<()> {
        self.send(AppEvent::StateChanged(view)).await
    }
}
