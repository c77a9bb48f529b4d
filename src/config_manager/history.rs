use serde::{Deserialize, Serialize};

/// Settings for the record of completed translations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Entries kept in memory; 0 turns recording off
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub persist_path: Option<String>,
}

fn default_capacity() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            persist_path: None,
        }
    }
}
