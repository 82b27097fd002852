use super::{id_required, serialize_menu_items, MenuItemBuilder, SerializeOptions, SerializePane, ViewBuilder, ViewFactory};
use crate::context::StructureContext;
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::id::validate_id;
use crate::node::{DocumentNode, DocumentOptions, PaneCommon, PaneNode, View};
use desk_schema::I18nTitle;
use im::Vector;
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for a document editor pane
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    context: Arc<StructureContext>,
    id: Option<String>,
    title: Option<String>,
    i18n: Option<I18nTitle>,
    document_id: Option<String>,
    schema_type: Option<String>,
    template: Option<String>,
    template_parameters: Option<serde_json::Value>,
    views: Vector<ViewBuilder>,
    default_panes: Option<Vec<String>>,
    menu_items: Vector<MenuItemBuilder>,
}

impl DocumentBuilder {
    pub(crate) fn new(context: Arc<StructureContext>) -> Self {
        Self {
            context,
            id: None,
            title: None,
            i18n: None,
            document_id: None,
            schema_type: None,
            template: None,
            template_parameters: None,
            views: Vector::new(),
            default_panes: None,
            menu_items: Vector::new(),
        }
    }

    /// Get explicit pane id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get document id
    #[inline]
    #[must_use]
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Get schema type name
    #[inline]
    #[must_use]
    pub fn schema_type(&self) -> Option<&str> {
        self.schema_type.as_deref()
    }

    /// Get configured views
    #[inline]
    #[must_use]
    pub fn views(&self) -> &Vector<ViewBuilder> {
        &self.views
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

    /// With edited document; also the pane id unless one is set
    #[must_use]
    pub fn with_document_id(&self, document_id: impl Into<String>) -> Self {
        let document_id = document_id.into();
        Self {
            id: self.id.clone().or_else(|| Some(document_id.clone())),
            document_id: Some(document_id),
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

    /// With initial value template for new documents
    #[must_use]
    pub fn with_initial_value_template(
        &self,
        template: impl Into<String>,
        parameters: Option<serde_json::Value>,
    ) -> Self {
        Self {
            template: Some(template.into()),
            template_parameters: parameters,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_views(&self, views: impl IntoIterator<Item = ViewBuilder>) -> Self {
        Self {
            views: views.into_iter().collect(),
            ..self.clone()
        }
    }

    /// With view ids opened side by side
    #[must_use]
    pub fn with_default_panes(&self, panes: Vec<String>) -> Self {
        Self {
            default_panes: Some(panes),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_menu_items(&self, items: impl IntoIterator<Item = MenuItemBuilder>) -> Self {
        Self {
            menu_items: items.into_iter().collect(),
            ..self.clone()
        }
    }

    fn effective_schema_type(&self) -> Option<String> {
        self.schema_type
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| {
                let template = self.template.as_deref()?;
                self.context.template(template).map(|t| t.schema_type.clone())
            })
    }

    fn serialize_views(&self, path: &[String], id: &str) -> Result<Vec<View>, SerializeError> {
        let views = if self.views.is_empty() {
            vec![ViewFactory.form().serialize(path, 0)?]
        } else {
            self.views
                .iter()
                .enumerate()
                .map(|(index, view)| view.serialize(path, index))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = views
            .iter()
            .map(View::id)
            .filter(|view_id| !seen.insert(*view_id))
            .collect();
        if !duplicates.is_empty() {
            return Err(SerializeError::new(
                format!("document node has views with duplicate IDs: {}", duplicates.join(", ")),
                &path[..path.len().saturating_sub(1)],
                PathSegment::Id(id.to_string()),
                None,
            ));
        }
        Ok(views)
    }
}

impl SerializePane for DocumentBuilder {
    fn serialize(&self, options: &SerializeOptions) -> Result<PaneNode, SerializeError> {
        let Some(id) = self
            .id
            .clone()
            .or_else(|| options.path.last().cloned())
            .filter(|id| !id.is_empty())
        else {
            return Err(id_required("document nodes", options));
        };
        validate_id(&id, &options.path, PathSegment::Id(id.clone()))?;

        let Some(document_id) = self.document_id.clone().filter(|id| !id.is_empty()) else {
            return Err(SerializeError::new(
                "document id (`id`) is required for document nodes",
                &options.path,
                PathSegment::Id(id),
                options.hint(),
            )
            .with_help_id(HelpId::DocumentIdRequired));
        };
        let Some(type_name) = self.effective_schema_type() else {
            return Err(SerializeError::new(
                "document type (`schemaType`) is required for document nodes",
                &options.path,
                PathSegment::Id(id),
                options.hint(),
            )
            .with_help_id(HelpId::DocumentTypeRequired));
        };

        let path = options.child_path(&id);
        let views = self.serialize_views(&path, &id)?;
        Ok(PaneNode::Document(DocumentNode {
            common: PaneCommon {
                id,
                title: self.title.clone(),
                i18n: self.i18n.clone(),
                menu_items: serialize_menu_items(&self.menu_items, &path)?,
                menu_item_groups: Vec::new(),
            },
            options: DocumentOptions {
                id: document_id,
                type_name,
                template: self.template.clone(),
                template_parameters: self.template_parameters.clone(),
            },
            views,
            default_panes: self.default_panes.clone(),
        }))
    }
}
