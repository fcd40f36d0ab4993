use std::path::PathBuf;

use kanal::AsyncSender;
use kotoba_types::{AppEvent, UiEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

pub const HELP: &str = "Commands: c camera | s snap | x cancel | u <path> upload | n next | p prev | o original | r reset | q quit";

/// One line of terminal input
#[derive(Debug, PartialEq)]
pub enum Input {
    Event(AppEvent),
    Help,
    Empty,
}

pub fn parse_command(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let event = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "h" | "help" | "?" => return Ok(Input::Help),
        "c" | "camera" => AppEvent::OpenCamera,
        "s" | "snap" => AppEvent::CaptureFrame,
        "x" | "cancel" => AppEvent::CancelCapture,
        "u" | "upload" => {
            let path = rest.trim_matches(|c| c == '"' || c == '\'');
            if path.is_empty() {
                return Err("upload needs a file path".to_string());
            }
            AppEvent::UploadImage(PathBuf::from(path))
        }
        "n" | "next" => AppEvent::UiEvent(UiEvent::NextPage),
        "p" | "prev" => AppEvent::UiEvent(UiEvent::PrevPage),
        "o" | "original" => AppEvent::UiEvent(UiEvent::ToggleOriginal),
        "r" | "reset" => AppEvent::Reset,
        "q" | "quit" | "exit" => AppEvent::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };

    Ok(Input::Event(event))
}

/// Read commands from stdin until quit, EOF or cancellation
pub async fn stdin_loop(
    cancel: CancellationToken,
    ui_to_app_tx: AsyncSender<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::info!("[INPUT] stdin closed");
            ui_to_app_tx.send(AppEvent::Quit).await?;
            break;
        };

        match parse_command(&line) {
            Ok(Input::Event(event)) => {
                let quit = matches!(event, AppEvent::Quit);
                ui_to_app_tx.send(event).await?;
                if quit {
                    break;
                }
            }
            Ok(Input::Help) => app_to_ui_tx.send(AppEvent::Notice(HELP.to_string())).await?,
            Ok(Input::Empty) => {}
            Err(message) => {
                app_to_ui_tx
                    .send(AppEvent::Notice(format!("{message}. {HELP}")))
                    .await?
            }
        }
    }

    tracing::debug!("[INPUT] Reader stopping");
    Ok(())
}
