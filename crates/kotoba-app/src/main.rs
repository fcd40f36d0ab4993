use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kotoba_capture::load_image_file;
use kotoba_core::{ApplicationState, StateEvent};
use tokio::signal;
use tracing::Instrument;
use uuid::Uuid;

mod cli;
mod context;
mod controller;
mod events;
mod io;
mod logging;
mod profile;
mod state;

#[cfg(test)]
mod tests;

use self::cli::{AnalyzeArgs, Cli, Command};
use self::controller::AppController;
use self::logging::{LogConfig, init_logging};
use self::state::AppState;

/// How long tasks get to release the camera after shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Scan);

    let log_config = LogConfig::new(
        cli.log_level,
        cli.log_format,
        matches!(command, Command::Scan),
    );
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let config = match profile::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let state = Arc::new(AppState::new(config));

    let outcome = match command {
        Command::Scan => run_scan(state).await,
        Command::Analyze(args) => run_analyze(state, args).await,
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_scan(state: Arc<AppState>) -> anyhow::Result<ExitCode> {
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks().await;
    let mut code = ExitCode::SUCCESS;

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(joined) = tasks.join_next() => {
            match joined {
                Ok(Ok(())) => tracing::info!("Session finished"),
                Ok(Err(e)) => {
                    tracing::error!("Task failed: {e:#}");
                    code = ExitCode::FAILURE;
                }
                Err(e) => {
                    tracing::error!("Task panicked: {e}");
                    code = ExitCode::FAILURE;
                }
            }
        }
    }

    controller.shutdown();
    while let Ok(Some(_)) = tokio::time::timeout(SHUTDOWN_GRACE, tasks.join_next()).await {}
    tasks.abort_all();

    Ok(code)
}

/// Analyze one file outside the interactive loop
async fn run_analyze(state: Arc<AppState>, args: AnalyzeArgs) -> anyhow::Result<ExitCode> {
    let image = load_image_file(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let scan_id = Uuid::new_v4();
    let machine = ApplicationState::default()
        .handle(StateEvent::ImageSubmitted)
        .into_state();

    let reply = state
        .analyzer
        .analyze(&image)
        .instrument(tracing::info_span!("scan", id = %scan_id, source = %args.file.display()))
        .await;

    let event = match reply {
        Ok(result) => StateEvent::AnalysisSucceeded(result),
        Err(e) => {
            tracing::error!(scan = %scan_id, "{}", e);
            StateEvent::AnalysisFailed(e.user_message().to_string())
        }
    };

    match machine.handle(event).into_state() {
        ApplicationState::Result(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", kotoba_ui::render::render_report(&result));
            }
            Ok(ExitCode::SUCCESS)
        }
        ApplicationState::Error(message) => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
        other => anyhow::bail!("analysis ended in unexpected state {}", other.phase()),
    }
}
