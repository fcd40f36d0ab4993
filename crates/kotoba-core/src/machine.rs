//! Session state machine.
//!
//! ```text
//! Idle --OpenCamera--> Capturing --ImageSubmitted--> Analyzing --AnalysisSucceeded--> Result
//!  |  \                    |                             \                              |
//!  |   `--ImageSubmitted---+---------------------------->  `--AnalysisFailed--> Error   |
//!  |                       |                                                     |      |
//!  `<--CancelCapture / CameraFailed                      Reset <-----------------+------'
//! ```

use std::fmt;

use kotoba_types::AnalysisResult;

/// Stored when a failure arrives without a message
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Analysis failed. Ensure the text is clear and contains identifiable grammar.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApplicationState {
    #[default]
    Idle,
    Capturing,
    Analyzing,
    Result(AnalysisResult),
    Error(String),
}

/// State without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Analyzing,
    Result,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Capturing => "capturing",
            Phase::Analyzing => "analyzing",
            Phase::Result => "result",
            Phase::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// User asked for the camera
    OpenCamera,
    /// Camera could not be acquired
    CameraFailed,
    /// User closed the camera
    CancelCapture,
    /// An image buffer is ready, from upload or capture
    ImageSubmitted,
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed(String),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved(ApplicationState),
    /// Event not allowed here; state is unchanged
    Rejected(ApplicationState),
}

impl Transition {
    pub fn into_state(self) -> ApplicationState {
        match self {
            Transition::Moved(state) | Transition::Rejected(state) => state,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, Transition::Moved(_))
    }
}

impl ApplicationState {
    pub fn phase(&self) -> Phase {
        match self {
            ApplicationState::Idle => Phase::Idle,
            ApplicationState::Capturing => Phase::Capturing,
            ApplicationState::Analyzing => Phase::Analyzing,
            ApplicationState::Result(_) => Phase::Result,
            ApplicationState::Error(_) => Phase::Error,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ApplicationState::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApplicationState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Apply `event`. Defined for every (state, event) pair.
    pub fn handle(self, event: StateEvent) -> Transition {
        use ApplicationState as S;
        use StateEvent as E;

        match (self, event) {
            (S::Idle, E::OpenCamera) => Transition::Moved(S::Capturing),
            (S::Idle, E::ImageSubmitted) => Transition::Moved(S::Analyzing),

            (S::Capturing, E::ImageSubmitted) => Transition::Moved(S::Analyzing),
            (S::Capturing, E::CancelCapture | E::CameraFailed) => Transition::Moved(S::Idle),

            (S::Analyzing, E::AnalysisSucceeded(result)) => match result.validate() {
                Ok(()) => Transition::Moved(S::Result(result)),
                Err(e) => {
                    tracing::warn!("Rejecting invalid analysis result: {}", e);
                    Transition::Moved(S::Error(DEFAULT_ERROR_MESSAGE.to_string()))
                }
            },
            (S::Analyzing, E::AnalysisFailed(message)) => {
                let message = if message.trim().is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    message
                };
                Transition::Moved(S::Error(message))
            }

            (S::Result(_) | S::Error(_), E::Reset) => Transition::Moved(S::Idle),

            (state, _) => Transition::Rejected(state),
        }
    }
}
