//! A loaded desk and the operations `deskctl` runs on it

use crate::config::{DeskFile, ProjectionConfig};
use crate::structure_file::{document_node_hook, StructureFileError};
use desk_resolver::{resolve_intent, PaneResolutionError, PaneResolver, ResolveIntentOptions, RouterPanes};
use desk_schema::{
    apply_ordering_functions, default_ordering_options, extended_projection, extended_projection_strict,
    ProjectionError, Schema, SchemaError, SortOrderingItem,
};
use desk_structure::{
    IntentParams, PaneNode, RouterPaneSiblingContext, StructureBuilder, StructureContext, UnresolvedPaneNode,
};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Deepest list nesting `validate` descends into
pub const MAX_VALIDATION_DEPTH: usize = 16;

/// Failures of desk operations
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid structure: {0}")]
    StructureFile(#[from] StructureFileError),

    #[error(transparent)]
    Resolution(#[from] PaneResolutionError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("no document type named \"{0}\" in schema")]
    UnknownDocumentType(String),
}

/// Pane reached while walking the structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneSummary {
    pub path: Vec<String>,
    pub id: String,
    pub kind: &'static str,
}

/// Sort ordering with the projection a list query needs for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingProjection {
    pub name: String,
    pub title: String,
    pub by: Vec<SortOrderingItem>,
    pub extended_projection: String,
}

/// Compiled schema plus the root pane of a desk file
#[derive(Debug, Clone)]
pub struct Desk {
    context: Arc<StructureContext>,
    root: UnresolvedPaneNode,
    projection: ProjectionConfig,
}

impl Desk {
    /// Compile the schema and structure of `file`
    ///
    /// Without a `structure` section the root is the default list of every
    /// document type.
    ///
    /// # Errors
    /// Fails when the schema does not compile or the structure tree puts a
    /// node where it cannot go.
    pub fn from_file(file: &DeskFile) -> Result<Self, DeskError> {
        let schema = Schema::compile(file.schema.types.clone())?;
        let context = Arc::new(
            StructureContext::new(Arc::new(schema))
                .with_default_document_node(document_node_hook(file.document_nodes.clone())),
        );
        let s = StructureBuilder::new(Arc::clone(&context));
        let root = match &file.structure {
            Some(spec) => spec.to_pane(&s)?,
            None => s.defaults().into(),
        };
        debug!(
            types = context.schema().document_types().count(),
            custom_structure = file.structure.is_some(),
            "Desk loaded"
        );
        Ok(Self {
            context,
            root,
            projection: file.projection,
        })
    }

    /// Get the structure context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Arc<StructureContext> {
        &self.context
    }

    /// Get the root pane
    #[inline]
    #[must_use]
    pub fn root(&self) -> &UnresolvedPaneNode {
        &self.root
    }

    /// Resolve every list reachable from the root
    ///
    /// Document lists, documents and components are resolved but not entered.
    /// Items without a child are skipped.
    ///
    /// # Errors
    /// Returns the first pane that fails to build or resolve, with its
    /// position in the tree.
    pub async fn validate(&self) -> Result<Vec<PaneSummary>, DeskError> {
        let resolver = PaneResolver::new();
        let mut found = Vec::new();
        let ctx = RouterPaneSiblingContext::root(Arc::clone(&self.context));
        walk(&resolver, self.root.clone(), ctx, &mut found).await?;
        info!(panes = found.len(), "Structure is valid");
        Ok(found)
    }

    /// Panes that open `params` for `intent`
    ///
    /// # Errors
    /// Fails when a pane on the way to the match cannot be resolved.
    pub async fn resolve(
        &self,
        intent: &str,
        params: IntentParams,
        payload: Option<Value>,
    ) -> Result<RouterPanes, DeskError> {
        let mut options = ResolveIntentOptions::new(self.root.clone(), Arc::clone(&self.context))
            .with_intent(intent)
            .with_params(params);
        if let Some(payload) = payload {
            options = options.with_payload(payload);
        }
        Ok(resolve_intent(options).await?)
    }

    /// Declared and default orderings of `type_name` with their projections
    ///
    /// # Errors
    /// Fails for names that are not document types, and for orderings on
    /// unknown fields when strict projections are configured.
    pub fn projections(&self, type_name: &str) -> Result<Vec<OrderingProjection>, DeskError> {
        let schema = self.context.schema();
        let schema_type = schema
            .get(type_name)
            .filter(|ty| ty.is_document_type())
            .ok_or_else(|| DeskError::UnknownDocumentType(type_name.to_string()))?;

        schema_type
            .orderings()
            .iter()
            .cloned()
            .chain(default_ordering_options())
            .map(|ordering| {
                let ordering = apply_ordering_functions(schema, &ordering, &schema_type);
                let extended_projection = if self.projection.strict {
                    extended_projection_strict(schema, &schema_type, &ordering.by)?
                } else {
                    extended_projection(schema, &schema_type, &ordering.by)
                };
                Ok(OrderingProjection {
                    name: ordering.name,
                    title: ordering.title,
                    by: ordering.by,
                    extended_projection,
                })
            })
            .collect()
    }
}

fn walk<'a>(
    resolver: &'a PaneResolver,
    node: UnresolvedPaneNode,
    ctx: RouterPaneSiblingContext,
    found: &'a mut Vec<PaneSummary>,
) -> BoxFuture<'a, Result<(), PaneResolutionError>> {
    async move {
        let pane = resolver
            .resolve(&node, &ctx, ctx.index)
            .await
            .map_err(|cause| PaneResolutionError::new(cause, ctx.clone()))?;
        debug!(path = ?ctx.path, id = %pane.id(), kind = pane.kind(), "Pane resolved");
        found.push(PaneSummary {
            path: ctx.path.clone(),
            id: pane.id().to_string(),
            kind: pane.kind(),
        });

        let PaneNode::List(list) = pane.as_ref() else {
            return Ok(());
        };
        if ctx.path.len() >= MAX_VALIDATION_DEPTH {
            return Ok(());
        }
        for item in list.list_items().filter(|item| item.child.is_some()) {
            let child_ctx = ctx.child(item.id.clone(), Arc::clone(&pane));
            walk(resolver, list.child.clone(), child_ctx, &mut *found).await?;
        }
        Ok(())
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DESK: &str = r"
schema:
  types:
    - name: book
      type: document
      title: Book
      fields:
        - name: title
          type: string
        - name: published
          type: datetime
      orderings:
        - name: titleAsc
          title: Title
          by:
            - field: title
    - name: settings
      type: document
structure:
  kind: list
  id: content
  title: Content
  items:
    - kind: documentTypeListItem
      schemaType: book
    - kind: listItem
      id: admin
      title: Admin
      child:
        kind: list
        id: admin
        title: Admin
        items:
          - kind: documentListItem
            id: settings
            title: Settings
            schemaType: settings
";

    fn desk(source: &str) -> Desk {
        Desk::from_file(&DeskFile::from_yaml(source).unwrap()).unwrap()
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn validate_walks_nested_lists() {
        let panes = desk(DESK).validate().await.unwrap();
        let seen: Vec<_> = panes.iter().map(|p| (p.path.clone(), p.kind)).collect();
        assert_eq!(
            seen,
            vec![
                (path(&[]), "list"),
                (path(&["book"]), "documentList"),
                (path(&["admin"]), "list"),
                (path(&["admin", "settings"]), "document"),
            ]
        );
    }

    #[tokio::test]
    async fn missing_structure_falls_back_to_defaults() {
        let desk = desk("schema:\n  types:\n    - name: book\n      type: document\n");
        let panes = desk.validate().await.unwrap();
        assert_eq!(panes[0].id, "content");
        assert_eq!(panes[1].path, path(&["book"]));
    }

    #[tokio::test]
    async fn resolve_finds_nested_documents() {
        let panes = desk(DESK)
            .resolve("edit", IntentParams::new().with("id", "settings").with("type", "settings"), None)
            .await
            .unwrap();
        let ids: Vec<Vec<&str>> = panes
            .iter()
            .map(|group| group.iter().map(|sibling| sibling.id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["admin"], vec!["settings"]]);
    }

    #[test]
    fn projections_list_declared_orderings_first() {
        let orderings = desk(DESK).projections("book").unwrap();
        let names: Vec<_> = orderings.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["titleAsc", "lastEditedDesc", "lastCreatedDesc"]);
        assert_eq!(orderings[0].extended_projection, "title");
        assert_eq!(orderings[1].extended_projection, "");
    }

    #[test]
    fn projections_reject_non_document_types() {
        let err = desk(DESK).projections("string").unwrap_err();
        assert!(matches!(err, DeskError::UnknownDocumentType(name) if name == "string"));
    }

    #[test]
    fn misplaced_nodes_fail_to_load() {
        let file = DeskFile::from_yaml("structure:\n  kind: divider\n").unwrap();
        let err = Desk::from_file(&file).unwrap_err();
        assert!(matches!(err, DeskError::StructureFile(StructureFileError::NotAPane { .. })));
    }
}
