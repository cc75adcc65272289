//! Convention-based discovery of producer output in the project tree.

mod history;
mod state;

use std::path::Path;

pub use history::{HistoryCounter, DEFAULT_HISTORY_PATTERN};
pub use state::{parse_state, scan_producer_states, SkillState};

/// Default state file name inside a producer directory.
pub const DEFAULT_STATE_FILE: &str = "STATE.json";

/// Default marker field identifying the owning producer.
pub const DEFAULT_MARKER_FIELD: &str = "skill";

/// Scans a project root using the configured conventions.
#[derive(Debug, Clone)]
pub struct ConventionScanner {
    state_file: String,
    marker_field: String,
    history: HistoryCounter,
}

impl ConventionScanner {
    /// Create a scanner.
    #[must_use]
    pub fn new(state_file: String, marker_field: String, history: HistoryCounter) -> Self {
        Self {
            state_file,
            marker_field,
            history,
        }
    }

    /// All producer states under `root`, sorted by directory.
    pub async fn scan_producer_states(&self, root: &Path) -> Vec<SkillState> {
        scan_producer_states(root, &self.state_file, &self.marker_field).await
    }

    /// Number of dated history entries under `root`.
    pub async fn count_history_entries(&self, root: &Path) -> usize {
        self.history.count(root).await
    }
}
