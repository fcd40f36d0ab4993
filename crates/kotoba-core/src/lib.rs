pub mod machine;

pub use machine::{ApplicationState, DEFAULT_ERROR_MESSAGE, Phase, StateEvent, Transition};
