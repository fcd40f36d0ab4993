pub mod render;
pub mod view;

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use kanal::AsyncReceiver;
use kotoba_config::ui::UiConfig;
use kotoba_types::{AppEvent, StateView};

pub use view::{ResultView, TOKENS_PER_PAGE};

/// Turns backend events into terminal output
pub struct UiRenderer<W: Write> {
    out: W,
    config: UiConfig,
    view: Option<ResultView>,
    spinner: Option<ProgressBar>,
    spinner_enabled: bool,
}

impl<W: Write> UiRenderer<W> {
    pub fn new(out: W, config: UiConfig, spinner_enabled: bool) -> Self {
        Self {
            out,
            config,
            view: None,
            spinner: None,
            spinner_enabled,
        }
    }

    /// Result currently on screen, if any
    pub fn view(&self) -> Option<&ResultView> {
        self.view.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn handle(&mut self, event: AppEvent) -> std::io::Result<()> {
        match event {
            AppEvent::StateChanged(state) => {
                self.stop_spinner();
                self.show_state(state)?;
            }
            AppEvent::CameraReady { width, height } => {
                write!(self.out, "{}", render::render_capturing(Some((width, height))))?;
            }
            AppEvent::Notice(message) => {
                writeln!(self.out, "! {message}")?;
            }
            AppEvent::UiEvent(ui_event) => match self.view.as_mut() {
                Some(view) => {
                    if view.handle(ui_event) {
                        let rendered = render::render_result(view);
                        write!(self.out, "{rendered}")?;
                    }
                }
                None => tracing::debug!("[UI] Ignoring {:?} without a result", ui_event),
            },
            other => tracing::debug!("[UI] Ignoring {:?}", std::mem::discriminant(&other)),
        }
        self.out.flush()
    }

    fn show_state(&mut self, state: StateView) -> std::io::Result<()> {
        // any state change ends the previous result's display lifetime
        self.view = None;

        match state {
            StateView::Idle => {
                write!(self.out, "{}", render::render_header())?;
                write!(self.out, "{}", render::render_idle())?;
            }
            StateView::Capturing => {
                write!(self.out, "{}", render::render_capturing(None))?;
            }
            StateView::Analyzing { source } => {
                if self.spinner_enabled {
                    self.start_spinner();
                } else {
                    write!(self.out, "{}", render::render_analyzing(&source))?;
                }
            }
            StateView::Result(result) => {
                let view = ResultView::new(result, self.config.original_expanded);
                write!(self.out, "{}", render::render_result(&view))?;
                self.view = Some(view);
            }
            StateView::Error(message) => {
                write!(self.out, "{}", render::render_error(&message))?;
            }
        }
        Ok(())
    }

    fn start_spinner(&mut self) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Identifying Grammar...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Render events from the backend until the channel closes
pub async fn ui_loop(app_to_ui_rx: AsyncReceiver<AppEvent>, config: UiConfig) -> anyhow::Result<()> {
    let spinner_enabled = atty::is(atty::Stream::Stderr);
    let mut renderer = UiRenderer::new(std::io::stdout(), config, spinner_enabled);

    while let Ok(event) = app_to_ui_rx.recv().await {
        if matches!(event, AppEvent::Quit) {
            break;
        }
        renderer.handle(event)?;
    }

    renderer.stop_spinner();
    tracing::debug!("[UI] Loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use kotoba_types::{AnalysisResult, GrammarToken, ImageSource, UiEvent};

    use super::*;

    fn result(count: usize) -> AnalysisResult {
        AnalysisResult {
            original_text: "本を読みました".to_string(),
            translation: "I read a book".to_string(),
            tokens: (0..count)
                .map(|i| GrammarToken {
                    surface: format!("読みました{i}"),
                    reading: "よみました".to_string(),
                    definition: "read (past polite)".to_string(),
                    notes: None,
                })
                .collect(),
        }
    }

    fn renderer() -> UiRenderer<Vec<u8>> {
        UiRenderer::new(Vec::new(), UiConfig::default(), false)
    }

    fn output(renderer: UiRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_result_then_paging() {
        let mut ui = renderer();
        ui.handle(AppEvent::StateChanged(StateView::Result(result(8))))
            .unwrap();
        ui.handle(AppEvent::UiEvent(UiEvent::NextPage)).unwrap();

        assert_eq!(ui.view().map(ResultView::current_page), Some(2));
        let out = output(ui);
        assert!(out.contains("1 / 2"));
        assert!(out.contains("2 / 2"));
    }

    #[test]
    fn test_new_result_resets_page() {
        let mut ui = renderer();
        ui.handle(AppEvent::StateChanged(StateView::Result(result(13))))
            .unwrap();
        ui.handle(AppEvent::UiEvent(UiEvent::NextPage)).unwrap();
        ui.handle(AppEvent::StateChanged(StateView::Idle)).unwrap();
        assert!(ui.view().is_none());

        ui.handle(AppEvent::StateChanged(StateView::Result(result(13))))
            .unwrap();
        assert_eq!(ui.view().map(ResultView::current_page), Some(1));
    }

    #[test]
    fn test_paging_without_result_is_ignored() {
        let mut ui = renderer();
        ui.handle(AppEvent::UiEvent(UiEvent::NextPage)).unwrap();
        assert!(output(ui).is_empty());
    }

    #[test]
    fn test_states_render_prompts() {
        let mut ui = renderer();
        ui.handle(AppEvent::StateChanged(StateView::Idle)).unwrap();
        ui.handle(AppEvent::StateChanged(StateView::Capturing)).unwrap();
        ui.handle(AppEvent::CameraReady {
            width: 1280,
            height: 720,
        })
        .unwrap();
        ui.handle(AppEvent::StateChanged(StateView::Analyzing {
            source: ImageSource::Camera,
        }))
        .unwrap();
        ui.handle(AppEvent::StateChanged(StateView::Error(
            "Analysis failed.".to_string(),
        )))
        .unwrap();
        ui.handle(AppEvent::Notice("Could not access camera.".to_string()))
            .unwrap();

        let out = output(ui);
        assert!(out.contains("[c] Open Camera"));
        assert!(out.contains("Opening camera"));
        assert!(out.contains("1280x720"));
        assert!(out.contains("Identifying Grammar"));
        assert!(out.contains("Analysis Failed"));
        assert!(out.contains("! Could not access camera."));
    }

    #[tokio::test]
    async fn test_ui_loop_stops_on_quit() {
        let (tx, rx) = kanal::bounded_async(8);
        let handle = tokio::spawn(ui_loop(rx, UiConfig::default()));

        tx.send(AppEvent::Notice("hello".to_string())).await.unwrap();
        tx.send(AppEvent::Quit).await.unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
