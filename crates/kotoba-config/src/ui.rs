use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UiConfig {
    /// Show the source text expanded when a result first appears
    #[serde(default)]
    pub original_expanded: bool,
}
