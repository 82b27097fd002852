use super::schema_type_not_found;
use crate::context::{DocumentNodeOptions, StructureContext};
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::id::{structure_node_id, validate_id};
use crate::node::ListItem;
use crate::unresolved::{ResolverOutput, UnresolvedPaneNode};
use desk_schema::I18nTitle;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListItemKind {
    Plain,
    /// Points at a single document; title optional, schema type required
    Document,
}

/// Builder for an entry of a list pane
#[derive(Debug, Clone)]
pub struct ListItemBuilder {
    context: Arc<StructureContext>,
    kind: ListItemKind,
    id: Option<String>,
    title: Option<String>,
    i18n: Option<I18nTitle>,
    title_is_optional: bool,
    schema_type: Option<String>,
    child: Option<UnresolvedPaneNode>,
}

impl ListItemBuilder {
    pub(crate) fn new(context: Arc<StructureContext>) -> Self {
        Self {
            context,
            kind: ListItemKind::Plain,
            id: None,
            title: None,
            i18n: None,
            title_is_optional: false,
            schema_type: None,
            child: None,
        }
    }

    pub(crate) fn document(context: Arc<StructureContext>) -> Self {
        Self {
            kind: ListItemKind::Document,
            title_is_optional: true,
            ..Self::new(context)
        }
    }

    /// Get explicit id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get title
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Get schema type name
    #[inline]
    #[must_use]
    pub fn schema_type(&self) -> Option<&str> {
        self.schema_type.as_deref()
    }

    #[must_use]
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_i18n(&self, i18n: I18nTitle) -> Self {
        Self {
            i18n: Some(i18n),
            ..self.clone()
        }
    }

    /// Allow serializing without a title
    #[must_use]
    pub fn with_title_is_optional(&self, optional: bool) -> Self {
        Self {
            title_is_optional: optional,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_schema_type(&self, schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_child(&self, child: impl Into<UnresolvedPaneNode>) -> Self {
        Self {
            child: Some(child.into()),
            ..self.clone()
        }
    }

    /// Validate and produce the item at `index` below `path`
    ///
    /// The child stays unresolved.
    ///
    /// # Errors
    /// Fails on a missing id, title or schema type, or an unknown schema type.
    pub fn serialize(&self, path: &[String], index: usize) -> Result<ListItem, SerializeError> {
        let Some(id) = structure_node_id(self.id.as_deref(), self.title.as_deref()) else {
            return Err(SerializeError::new(
                "`id` is required for list items",
                path,
                PathSegment::Index(index),
                self.title.as_deref(),
            )
            .with_help_id(HelpId::IdRequired));
        };
        validate_id(&id, path, PathSegment::Index(index))?;

        if !self.title_is_optional && self.title.is_none() && self.i18n.is_none() {
            return Err(SerializeError::new(
                "`title` is required for list items",
                path,
                PathSegment::Id(id),
                None,
            )
            .with_help_id(HelpId::TitleRequired));
        }

        let schema_type = self.schema_type.clone().filter(|name| !name.is_empty());
        match &schema_type {
            Some(name) if !self.context.schema().contains(name) => {
                return Err(schema_type_not_found(name, path, PathSegment::Id(id)));
            }
            None if self.kind == ListItemKind::Document => {
                return Err(SerializeError::new(
                    "`schemaType` is required for document list items",
                    path,
                    PathSegment::Id(id),
                    None,
                )
                .with_help_id(HelpId::SchemaTypeRequired));
            }
            _ => {}
        }

        let child = match (&self.child, self.kind, &schema_type) {
            (Some(child), _, _) => Some(child.clone()),
            (None, ListItemKind::Document, Some(name)) => Some(document_child(name.clone())),
            _ => None,
        };

        Ok(ListItem {
            id,
            title: self.title.clone(),
            i18n: self.i18n.clone(),
            schema_type,
            child,
        })
    }
}

// The pane takes the item id so the document is an exact intent match.
fn document_child(schema_type: String) -> UnresolvedPaneNode {
    UnresolvedPaneNode::resolver(move |id, ctx| {
        let options = DocumentNodeOptions::new(schema_type.clone()).with_document_id(id);
        ResolverOutput::ready(ctx.structure_context.resolve_document_node(&options).with_id(id))
    })
}
