//! Fallback editor for intents nothing in the tree claims

use crate::router::{RouterPanes, RouterPaneSibling};
use desk_structure::{
    published_id, ChildResolver, DocumentNodeOptions, IntentParams, ResolverOutput, StructureError, EDIT_PREFIX,
};

/// Single-pane path opening the target document in the fallback editor
///
/// Carries every param except `id`.
#[must_use]
pub fn fallback_panes(params: &IntentParams, payload: Option<&serde_json::Value>) -> RouterPanes {
    let target = params.id().unwrap_or_default();
    vec![vec![RouterPaneSibling::new(format!("{EDIT_PREFIX}{target}"))
        .with_params(params.without(&["id"]))
        .with_payload(payload.cloned())]]
}

/// Child resolver turning a `__edit__<id>` pane into a document node
///
/// The document type comes from the `type` router param. A `template`
/// param, if present, becomes the document's initial value template with
/// the pane payload as its parameters.
#[must_use]
pub fn fallback_editor_child() -> ChildResolver {
    ChildResolver::new(|pane_id, ctx| {
        let document_id = pane_id.strip_prefix(EDIT_PREFIX).unwrap_or(pane_id);
        let Some(schema_type) = ctx.params.get("type") else {
            return ResolverOutput::Ready(Err(StructureError::resolver(format!(
                "Document type for document with ID {document_id} was not provided in the router params"
            ))));
        };

        let options = DocumentNodeOptions::new(schema_type.as_str()).with_document_id(published_id(document_id));
        let mut builder = ctx.structure_context.resolve_document_node(&options).with_id("editor");
        if let Some(template) = ctx.params.get("template") {
            builder = builder.with_initial_value_template(template.as_str(), ctx.payload.clone());
        }
        ResolverOutput::ready(builder)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane_resolver::PaneResolver;
    use desk_structure::{RouterPaneSiblingContext, StructureContext, UnresolvedPaneNode};
    use serde_json::json;
    use std::sync::Arc;

    fn edit_context(params: &[(&str, &str)]) -> RouterPaneSiblingContext {
        let mut ctx = RouterPaneSiblingContext::root(Arc::new(StructureContext::empty()));
        ctx.id = "__edit__drafts.b1".to_string();
        ctx.params = params.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        ctx.payload = Some(json!({ "title": "Draft" }));
        ctx
    }

    #[test]
    fn fallback_keeps_everything_but_the_id() {
        let params = IntentParams::new().with("id", "a1").with("type", "author").with("view", "json");
        let panes = fallback_panes(&params, None);
        assert_eq!(panes.len(), 1);
        assert_eq!(panes[0][0].id, "__edit__a1");
        let keys: Vec<_> = panes[0][0].params.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["type", "view"]);
    }

    #[tokio::test]
    async fn editor_child_needs_a_type() {
        let node = UnresolvedPaneNode::Resolver(fallback_editor_child());
        let err = PaneResolver::new().resolve(&node, &edit_context(&[]), 1).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document type for document with ID drafts.b1 was not provided in the router params"
        );
    }

    #[tokio::test]
    async fn editor_child_opens_the_published_document() {
        let node = UnresolvedPaneNode::Resolver(fallback_editor_child());
        let ctx = edit_context(&[("type", "book"), ("template", "book-by-author")]);
        let resolved = PaneResolver::new().resolve(&node, &ctx, 1).await.unwrap();
        let document = resolved.as_document().unwrap();
        assert_eq!(document.common.id, "editor");
        assert_eq!(document.options.id, "b1");
        assert_eq!(document.options.type_name, "book");
        assert_eq!(document.options.template.as_deref(), Some("book-by-author"));
        assert_eq!(document.options.template_parameters, Some(json!({ "title": "Draft" })));
    }
}
