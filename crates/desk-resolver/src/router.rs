//! Router panes: the resolved navigation path

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One pane of a pane group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterPaneSibling {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl RouterPaneSibling {
    /// Pane addressed by id alone
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: None,
            payload: None,
        }
    }

    /// With router params
    #[must_use]
    pub fn with_params(mut self, params: IndexMap<String, String>) -> Self {
        self.params = Some(params);
        self
    }

    /// With payload
    #[must_use]
    pub fn with_payload(mut self, payload: Option<serde_json::Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Get a router param
    #[inline]
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.as_ref()?.get(key).map(String::as_str)
    }
}

/// Panes shown side by side for one tree position
pub type RouterPaneGroup = Vec<RouterPaneSibling>;

/// Full navigation path, outermost group first
pub type RouterPanes = Vec<RouterPaneGroup>;

/// Single-pane groups for each id of `path`
#[must_use]
pub fn singleton_groups<'a>(path: impl IntoIterator<Item = &'a String>) -> RouterPanes {
    path.into_iter().map(|id| vec![RouterPaneSibling::new(id.clone())]).collect()
}
