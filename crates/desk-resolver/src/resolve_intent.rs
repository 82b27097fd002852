//! Intent matching
//!
//! Walks the structure from the root, resolving panes lazily, and collects
//! every pane that can open the intent's target document. The shallowest
//! candidate wins, ties go to the earliest sibling. When nothing matches, the
//! target opens in the fallback editor.

use crate::error::PaneResolutionError;
use crate::fallback::fallback_panes;
use crate::pane_resolver::PaneResolver;
use crate::router::{singleton_groups, RouterPaneGroup, RouterPaneSibling, RouterPanes};
use crate::split_panes::document_group;
use desk_structure::{
    DocumentNodeOptions, IntentParams, PaneNode, RouterPaneSiblingContext, SerializeOptions, SerializePane,
    StructureContext, UnresolvedPaneNode, DEFAULT_TYPE_FILTER, EDIT,
};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use ulid::Ulid;

/// Input of [`resolve_intent`]
#[derive(Clone)]
pub struct ResolveIntentOptions {
    pub root_pane_node: UnresolvedPaneNode,
    pub intent: String,
    pub params: IntentParams,
    pub payload: Option<serde_json::Value>,
    pub structure_context: Arc<StructureContext>,
}

impl ResolveIntentOptions {
    /// Resolve an `edit` intent without params against `root_pane_node`
    #[must_use]
    pub fn new(root_pane_node: impl Into<UnresolvedPaneNode>, structure_context: Arc<StructureContext>) -> Self {
        Self {
            root_pane_node: root_pane_node.into(),
            intent: EDIT.to_string(),
            params: IntentParams::new(),
            payload: None,
            structure_context,
        }
    }

    #[must_use]
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: IntentParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl std::fmt::Debug for ResolveIntentOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveIntentOptions")
            .field("root_pane_node", &self.root_pane_node)
            .field("intent", &self.intent)
            .field("params", &self.params)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// Router panes opening the intent's target document
///
/// Each call resolves with a fresh cache, so resolver functions may run again
/// on a later call.
///
/// # Errors
/// Returns [`PaneResolutionError`] when a visited pane fails to serialize or
/// its resolver function fails.
pub async fn resolve_intent(options: ResolveIntentOptions) -> Result<RouterPanes, PaneResolutionError> {
    let span = info_span!(
        "resolve_intent",
        session = %Ulid::new(),
        intent = %options.intent,
        document_id = options.params.id().unwrap_or_default(),
    );
    async move {
        let session = Session {
            resolver: PaneResolver::new(),
            intent: &options.intent,
            params: &options.params,
            payload: options.payload.as_ref(),
            target_id: options.params.id().unwrap_or_default(),
            target_type: options.params.type_name(),
            group_params: options.params.without(&["id", "type"]),
            structure_context: &options.structure_context,
        };

        let root = RouterPaneSiblingContext::root(Arc::clone(&options.structure_context));
        let candidates = session.traverse(options.root_pane_node.clone(), root, 0).await?;
        debug!(count = candidates.len(), panes = session.resolver.len(), "Traversal finished");

        match select(candidates) {
            Some(panes) => {
                info!(groups = panes.len(), "Intent resolved");
                Ok(panes)
            }
            None => {
                info!("No pane handles the intent, using fallback editor");
                Ok(fallback_panes(&options.params, options.payload.as_ref()))
            }
        }
    }
    .instrument(span)
    .await
}

#[derive(Debug)]
struct Match {
    depth_index: usize,
    level_index: usize,
    panes: RouterPanes,
}

/// Shallowest match wins, then the earliest sibling
fn select(mut candidates: Vec<Match>) -> Option<RouterPanes> {
    candidates.sort_by_key(|candidate| (candidate.depth_index, candidate.level_index));
    candidates.into_iter().next().map(|candidate| candidate.panes)
}

struct Session<'a> {
    resolver: PaneResolver,
    intent: &'a str,
    params: &'a IntentParams,
    payload: Option<&'a serde_json::Value>,
    target_id: &'a str,
    target_type: Option<&'a str>,
    group_params: IndexMap<String, String>,
    structure_context: &'a Arc<StructureContext>,
}

impl<'a> Session<'a> {
    fn traverse(
        &'a self,
        unresolved: UnresolvedPaneNode,
        ctx: RouterPaneSiblingContext,
        level_index: usize,
    ) -> BoxFuture<'a, Result<Vec<Match>, PaneResolutionError>> {
        async move {
            let pane = self
                .resolver
                .resolve(&unresolved, &ctx, ctx.index)
                .await
                .map_err(|cause| PaneResolutionError::new(cause, ctx.clone()))?;
            let depth_index = ctx.path.len();

            if let PaneNode::Document(document) = pane.as_ref() {
                if document.common.id == self.target_id {
                    debug!(pane = %document.common.id, depth_index, level_index, "Document matches intent");
                    let mut panes = singleton_groups(&ctx.path[..depth_index.saturating_sub(1)]);
                    panes.push(document_group(document, self.target_id, &self.group_params, self.payload));
                    return Ok(vec![Match {
                        depth_index,
                        level_index,
                        panes,
                    }]);
                }
            }

            if pane.can_handle_intent(self.intent, self.params, ctx.index) || self.is_default_list(&pane) {
                debug!(pane = %pane.id(), depth_index, level_index, "Pane handles intent");
                let mut panes = singleton_groups(&ctx.path);
                panes.push(self.target_group(&ctx.path));
                return Ok(vec![Match {
                    depth_index,
                    level_index,
                    panes,
                }]);
            }

            if let PaneNode::List(list) = pane.as_ref() {
                if list.items.is_empty() {
                    return Ok(Vec::new());
                }
                let branches = list.list_items().enumerate().map(|(level_index, item)| {
                    let child_ctx = ctx.child(item.id.clone(), Arc::clone(&pane));
                    self.traverse(list.child.clone(), child_ctx, level_index)
                });
                let found = try_join_all(branches).await?;
                return Ok(found.into_iter().flatten().collect());
            }

            Ok(Vec::new())
        }
        .boxed()
    }

    fn is_default_list(&self, pane: &PaneNode) -> bool {
        pane.as_document_list().is_some_and(|list| {
            self.target_type.is_some()
                && list.schema_type_name.as_deref() == self.target_type
                && list.options.filter == DEFAULT_TYPE_FILTER
        })
    }

    fn single_pane(&self) -> RouterPaneGroup {
        vec![RouterPaneSibling::new(self.target_id)
            .with_params(self.group_params.clone())
            .with_payload(self.payload.cloned())]
    }

    /// Group for the target document, split by its default panes
    fn target_group(&self, path: &[String]) -> RouterPaneGroup {
        let Some(schema_type) = self.target_type else {
            return self.single_pane();
        };
        let options = DocumentNodeOptions::new(schema_type).with_document_id(self.target_id);
        let mut document_path = path.to_vec();
        document_path.push(self.target_id.to_string());

        match self
            .structure_context
            .resolve_document_node(&options)
            .serialize(&SerializeOptions::at(document_path))
        {
            Ok(PaneNode::Document(document)) => {
                document_group(&document, self.target_id, &self.group_params, self.payload)
            }
            Ok(other) => {
                warn!(kind = other.kind(), "Document node resolved to a different pane kind");
                self.single_pane()
            }
            Err(err) => {
                warn!(error = %err, "Could not resolve document node for default panes");
                self.single_pane()
            }
        }
    }
}
