use serde::{Deserialize, Serialize};

/// Per-user filtering preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterPreferences {
    /// Mirror the active filters into the page URL
    pub sync_url: bool,
    pub results_per_page: u32,
    pub sort_by: String,
}

impl Default for FilterPreferences {
    fn default() -> Self {
        Self {
            sync_url: true,
            results_per_page: 20,
            sort_by: "relevance".to_string(),
        }
    }
}
