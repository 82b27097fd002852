use super::{
    generic_list_setters, id_required, schema_type_not_found, GenericListSpec, SerializeOptions, SerializePane,
    StructureBuilder,
};
use crate::context::{DocumentNodeOptions, StructureContext};
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::intent::{type_names_from_filter, IntentChecker, DEFAULT_TYPE_FILTER};
use crate::node::{DocumentListNode, DocumentListOptions, InitialValueTemplateItem, PaneNode};
use crate::unresolved::{ChildResolver, ResolverOutput, ResolverResult, UnresolvedPaneNode};
use desk_schema::SortOrderingItem;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// API version used for the canonical type filter
pub const DEFAULT_API_VERSION: &str = "2023-11-13";

/// API version assumed for custom filters that do not name one
pub const LEGACY_API_VERSION: &str = "1";

/// Builder for a pane listing the documents a filter matches
#[derive(Clone)]
pub struct DocumentListBuilder {
    context: Arc<StructureContext>,
    spec: GenericListSpec,
    schema_type_name: Option<String>,
    filter: Option<String>,
    params: IndexMap<String, serde_json::Value>,
    api_version: Option<String>,
    default_ordering: Vec<SortOrderingItem>,
}

generic_list_setters!(DocumentListBuilder);

impl DocumentListBuilder {
    pub(crate) fn new(context: Arc<StructureContext>) -> Self {
        Self {
            context,
            spec: GenericListSpec::default(),
            schema_type_name: None,
            filter: None,
            params: IndexMap::new(),
            api_version: None,
            default_ordering: Vec::new(),
        }
    }

    /// Get filter
    #[inline]
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Get schema type name
    #[inline]
    #[must_use]
    pub fn schema_type_name(&self) -> Option<&str> {
        self.schema_type_name.as_deref()
    }

    #[must_use]
    pub fn with_filter(&self, filter: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.filter = Some(filter.into());
        next
    }

    /// With one filter parameter added
    #[must_use]
    pub fn with_param(&self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let mut next = self.clone();
        next.params.insert(key.into(), value.into());
        next
    }

    /// With filter parameters replacing the current ones
    #[must_use]
    pub fn with_params(&self, params: IndexMap<String, serde_json::Value>) -> Self {
        let mut next = self.clone();
        next.params = params;
        next
    }

    #[must_use]
    pub fn with_api_version(&self, version: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.api_version = Some(version.into());
        next
    }

    #[must_use]
    pub fn with_schema_type(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.schema_type_name = Some(name.into());
        next
    }

    #[must_use]
    pub fn with_default_ordering(&self, ordering: Vec<SortOrderingItem>) -> Self {
        let mut next = self.clone();
        next.default_ordering = ordering;
        next
    }

    fn inferred_type_names(&self, filter: &str) -> Vec<String> {
        match &self.schema_type_name {
            Some(name) => vec![name.clone()],
            None => type_names_from_filter(filter, &self.params),
        }
    }

    fn initial_value_templates(
        &self,
        type_names: &[String],
        path: &[String],
    ) -> Result<Vec<InitialValueTemplateItem>, SerializeError> {
        if self.spec.initial_value_templates.is_some() {
            return self.spec.serialize_templates(&self.context, path);
        }
        let mut seen = IndexSet::new();
        Ok(type_names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .flat_map(|name| self.context.templates_for_type(name))
            .map(|template| InitialValueTemplateItem {
                id: template.id.clone(),
                template_id: template.id.clone(),
                schema_type: template.schema_type.clone(),
                title: Some(template.title.clone()),
                parameters: template.parameters.clone(),
            })
            .collect())
    }
}

impl std::fmt::Debug for DocumentListBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentListBuilder")
            .field("id", &self.spec.id)
            .field("filter", &self.filter)
            .field("schema_type_name", &self.schema_type_name)
            .finish_non_exhaustive()
    }
}

impl SerializePane for DocumentListBuilder {
    fn serialize(&self, options: &SerializeOptions) -> Result<PaneNode, SerializeError> {
        let Some(id) = self.spec.effective_id() else {
            return Err(SerializeError::new(
                "`id` is required for document lists",
                &options.path,
                PathSegment::of(None, options.index),
                self.spec.title.as_deref().or(options.hint()),
            )
            .with_help_id(HelpId::IdRequired));
        };
        let Some(filter) = self.filter.clone() else {
            return Err(SerializeError::new(
                "`filter` is required for document lists",
                &options.path,
                PathSegment::Id(id),
                options.hint(),
            )
            .with_help_id(HelpId::FilterRequired));
        };
        validate_filter(&filter, &options.path, &id)?;

        if let Some(name) = &self.schema_type_name {
            if !self.context.schema().contains(name) {
                return Err(schema_type_not_found(name, &options.path, PathSegment::Id(id)));
            }
        }

        let is_default_filter = filter == DEFAULT_TYPE_FILTER;
        let api_version = match (&self.api_version, is_default_filter) {
            (Some(version), _) => version.clone(),
            (None, true) => DEFAULT_API_VERSION.to_string(),
            (None, false) => {
                tracing::warn!(
                    list = %id,
                    "document list has a custom filter but no API version, assuming {LEGACY_API_VERSION}"
                );
                LEGACY_API_VERSION.to_string()
            }
        };

        let common = self.spec.serialize_common(&id, options)?;
        let path = options.child_path(&id);
        let type_names = self.inferred_type_names(&filter);
        let schema_type_name = match type_names.as_slice() {
            [single] => Some(single.clone()),
            _ => None,
        };

        Ok(PaneNode::DocumentList(DocumentListNode {
            common,
            initial_value_templates: self.initial_value_templates(&type_names, &path)?,
            schema_type_name,
            options: DocumentListOptions {
                filter,
                params: self.params.clone(),
                api_version,
                default_ordering: self.default_ordering.clone(),
            },
            default_layout: self.spec.default_layout,
            child: self
                .spec
                .child
                .clone()
                .unwrap_or_else(|| UnresolvedPaneNode::Resolver(document_child_resolver())),
            can_handle_intent: self.spec.can_handle_intent.clone().unwrap_or_else(IntentChecker::shallow),
        }))
    }
}

fn validate_filter(filter: &str, path: &[String], id: &str) -> Result<(), SerializeError> {
    let trimmed = filter.trim_start();
    match trimmed.chars().next() {
        Some(first @ ('*' | '{')) => Err(SerializeError::new(
            format!("`filter` cannot start with `{first}` - looks like you are providing a query, not a filter"),
            path,
            PathSegment::Id(id.to_string()),
            None,
        )
        .with_help_id(HelpId::QueryProvidedForFilter)),
        _ => Ok(()),
    }
}

/// Child resolver opening the document with the requested id
///
/// The document type comes from a `template` router param, then from the
/// list, then from the document type lookup. Without any of them the
/// document is opened untyped, which fails when serialized.
#[must_use]
pub fn document_child_resolver() -> ChildResolver {
    ChildResolver::new(|item_id, ctx| {
        let structure = Arc::clone(&ctx.structure_context);
        let list_type = ctx
            .parent
            .as_deref()
            .and_then(PaneNode::as_document_list)
            .and_then(|list| list.schema_type_name.clone());
        let template_type = ctx
            .params
            .get("template")
            .and_then(|id| structure.template(id))
            .map(|template| template.schema_type.clone());

        if let Some(schema_type) = template_type.or(list_type) {
            let options = DocumentNodeOptions::new(schema_type).with_document_id(item_id);
            return ResolverOutput::ready(structure.resolve_document_node(&options));
        }

        let item_id = item_id.to_string();
        ResolverOutput::pending(async move {
            let builder = match structure.resolve_type_for_document(&item_id).await? {
                Some(schema_type) => {
                    structure.resolve_document_node(&DocumentNodeOptions::new(schema_type).with_document_id(&item_id))
                }
                None => StructureBuilder::new(Arc::clone(&structure))
                    .document()
                    .with_id("editor")
                    .with_document_id(item_id)
                    .with_schema_type(""),
            };
            ResolverResult::Ok(Some(builder.into()))
        })
    })
}
