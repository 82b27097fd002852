//! Pane group for a matched document

use crate::router::{RouterPaneGroup, RouterPaneSibling};
use desk_structure::DocumentNode;
use indexmap::IndexMap;
use tracing::warn;

/// Sibling group opening `target_id` with `document`'s default panes
///
/// Two or more known default panes give one sibling per view, each with the
/// `view` param set. Anything less gives a single sibling without a view.
/// Default pane ids naming no declared view are dropped.
#[must_use]
pub fn document_group(
    document: &DocumentNode,
    target_id: &str,
    params: &IndexMap<String, String>,
    payload: Option<&serde_json::Value>,
) -> RouterPaneGroup {
    let views: Vec<&str> = document
        .default_panes
        .iter()
        .flatten()
        .filter(|view_id| {
            let known = document.has_view(view_id);
            if !known {
                warn!(
                    document = %document.common.id,
                    view = %view_id,
                    "Default pane names a view the document does not have, skipping"
                );
            }
            known
        })
        .map(String::as_str)
        .collect();

    let sibling = |params: IndexMap<String, String>| {
        RouterPaneSibling::new(target_id)
            .with_params(params)
            .with_payload(payload.cloned())
    };

    if views.len() < 2 {
        return vec![sibling(params.clone())];
    }

    views
        .into_iter()
        .map(|view_id| {
            let mut params = params.clone();
            params.insert("view".to_string(), view_id.to_string());
            sibling(params)
        })
        .collect()
}
