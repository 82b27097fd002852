//! Ambient capabilities shared by every builder and resolver
//!
//! The structure context owns the schema, the initial value templates, an
//! optional hook providing default document nodes, and an optional lookup
//! resolving the type of a document by id.

use crate::builder::{DocumentBuilder, StructureBuilder};
use crate::error::StructureError;
use desk_schema::Schema;
use std::fmt;
use std::sync::Arc;

/// Prefix of draft document ids
pub const DRAFTS_PREFIX: &str = "drafts.";

/// Template for creating new documents
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialValueTemplate {
    pub id: String,
    pub schema_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Which document a default document node is wanted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNodeOptions {
    pub schema_type: String,
    pub document_id: Option<String>,
}

impl DocumentNodeOptions {
    /// Create options for a document of `schema_type`
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            document_id: None,
        }
    }

    /// With document id
    #[must_use]
    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }
}

type DefaultDocumentNodeFn =
    dyn Fn(&StructureBuilder, &DocumentNodeOptions) -> Option<DocumentBuilder> + Send + Sync;

/// Resolves the schema type of a stored document
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentTypeLookup: Send + Sync {
    /// Type name of the document with `id`, if it exists
    async fn resolve_type_for_document(&self, id: &str) -> Result<Option<String>, StructureError>;
}

/// Read-only capabilities shared through a resolution session
pub struct StructureContext {
    schema: Arc<Schema>,
    templates: Vec<InitialValueTemplate>,
    default_document_node: Option<Arc<DefaultDocumentNodeFn>>,
    document_type_lookup: Option<Arc<dyn DocumentTypeLookup>>,
}

impl StructureContext {
    /// Create context with one default template per document type
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let templates = schema
            .document_types()
            .map(|ty| InitialValueTemplate {
                id: ty.name().to_string(),
                schema_type: ty.name().to_string(),
                title: ty.title().unwrap_or(ty.name()).to_string(),
                parameters: None,
            })
            .collect();
        Self {
            schema,
            templates,
            default_document_node: None,
            document_type_lookup: None,
        }
    }

    /// Context over a schema without user types
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Arc::new(Schema::default()))
    }

    /// With templates replacing the defaults
    #[must_use]
    pub fn with_templates(mut self, templates: Vec<InitialValueTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// With hook providing default document nodes
    #[must_use]
    pub fn with_default_document_node<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StructureBuilder, &DocumentNodeOptions) -> Option<DocumentBuilder> + Send + Sync + 'static,
    {
        self.default_document_node = Some(Arc::new(hook));
        self
    }

    /// With document type lookup
    #[must_use]
    pub fn with_document_type_lookup(mut self, lookup: Arc<dyn DocumentTypeLookup>) -> Self {
        self.document_type_lookup = Some(lookup);
        self
    }

    /// Get schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get initial value templates
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &[InitialValueTemplate] {
        &self.templates
    }

    /// Look up a template by id
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&InitialValueTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Templates creating documents of `schema_type`
    pub fn templates_for_type<'a>(
        &'a self,
        schema_type: &'a str,
    ) -> impl Iterator<Item = &'a InitialValueTemplate> + 'a {
        self.templates
            .iter()
            .filter(move |template| template.schema_type == schema_type)
    }

    /// Document node for a document, from the hook or a plain document builder
    ///
    /// The pane id defaults to `editor`. A `drafts.` prefix on the document id
    /// is stripped.
    #[must_use]
    pub fn resolve_document_node(self: &Arc<Self>, options: &DocumentNodeOptions) -> DocumentBuilder {
        let structure = StructureBuilder::new(Arc::clone(self));
        let mut builder = self
            .default_document_node
            .as_ref()
            .and_then(|hook| hook(&structure, options))
            .unwrap_or_else(|| structure.document());

        if builder.id().is_none() {
            builder = builder.with_id("editor");
        }
        if let Some(document_id) = &options.document_id {
            builder = builder.with_document_id(published_id(document_id));
        }
        builder.with_schema_type(&options.schema_type)
    }

    /// Resolve a document's type through the lookup, if one is configured
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub async fn resolve_type_for_document(&self, id: &str) -> Result<Option<String>, StructureError> {
        match &self.document_type_lookup {
            Some(lookup) => lookup.resolve_type_for_document(id).await,
            None => Ok(None),
        }
    }
}

impl fmt::Debug for StructureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureContext")
            .field("types", &self.schema.type_names().collect::<Vec<_>>())
            .field("templates", &self.templates.len())
            .field("default_document_node", &self.default_document_node.is_some())
            .field("document_type_lookup", &self.document_type_lookup.is_some())
            .finish()
    }
}

/// Document id without the draft prefix
#[must_use]
pub fn published_id(id: &str) -> &str {
    id.strip_prefix(DRAFTS_PREFIX).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SerializePane;
    use crate::builder::SerializeOptions;
    use desk_schema::TypeDef;

    fn context() -> Arc<StructureContext> {
        let schema = Schema::compile([
            TypeDef::named("book", "document").with_title("Book"),
            TypeDef::named("author", "document"),
            TypeDef::named("address", "object"),
        ])
        .unwrap();
        Arc::new(StructureContext::new(Arc::new(schema)))
    }

    #[test]
    fn default_templates_cover_document_types() {
        let ctx = context();
        let ids: Vec<_> = ctx.templates().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["book", "author"]);
        assert_eq!(ctx.template("book").unwrap().title, "Book");
        assert_eq!(ctx.template("author").unwrap().title, "author");
    }

    #[test]
    fn plain_document_node_strips_draft_prefix() {
        let ctx = context();
        let node = ctx
            .resolve_document_node(&DocumentNodeOptions::new("book").with_document_id("drafts.abc"))
            .serialize(&SerializeOptions::default())
            .unwrap();
        let document = node.as_document().unwrap();
        assert_eq!(document.common.id, "editor");
        assert_eq!(document.options.id, "abc");
        assert_eq!(document.options.type_name, "book");
    }

    #[test]
    fn hook_provides_views_and_keeps_its_id() {
        let schema = Arc::clone(context().schema());
        let ctx = Arc::new(StructureContext::new(schema).with_default_document_node(|s, options| {
            (options.schema_type == "book").then(|| {
                s.document()
                    .with_id("bookEditor")
                    .with_views(vec![s.view().form(), s.view().component("preview").with_title("Preview")])
                    .with_default_panes(vec!["editor".into(), "preview".into()])
            })
        }));

        let node = ctx
            .resolve_document_node(&DocumentNodeOptions::new("book").with_document_id("b1"))
            .serialize(&SerializeOptions::default())
            .unwrap();
        let document = node.as_document().unwrap();
        assert_eq!(document.common.id, "bookEditor");
        assert_eq!(document.views.len(), 2);
        assert_eq!(document.default_panes.as_deref(), Some(&["editor".to_string(), "preview".to_string()][..]));

        let plain = ctx
            .resolve_document_node(&DocumentNodeOptions::new("author").with_document_id("a1"))
            .serialize(&SerializeOptions::default())
            .unwrap();
        assert_eq!(plain.id(), "editor");
    }

    #[tokio::test]
    async fn type_lookup_is_optional() {
        let ctx = context();
        assert_eq!(ctx.resolve_type_for_document("x").await.unwrap(), None);

        let mut lookup = MockDocumentTypeLookup::new();
        lookup
            .expect_resolve_type_for_document()
            .withf(|id: &str| id == "b1")
            .returning(|_| Ok(Some("book".to_string())));
        let ctx = StructureContext::new(Arc::clone(ctx.schema())).with_document_type_lookup(Arc::new(lookup));
        assert_eq!(ctx.resolve_type_for_document("b1").await.unwrap().as_deref(), Some("book"));
    }
}
