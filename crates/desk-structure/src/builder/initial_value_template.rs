use crate::context::StructureContext;
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::node::InitialValueTemplateItem;

/// Builder for a template offered from a list's create menu
#[derive(Debug, Clone, Default)]
pub struct InitialValueTemplateItemBuilder {
    id: Option<String>,
    title: Option<String>,
    template_id: Option<String>,
    parameters: Option<serde_json::Value>,
}

impl InitialValueTemplateItemBuilder {
    /// Item for `template_id`, the item id defaults to the template id
    #[must_use]
    pub fn new(template_id: impl Into<String>) -> Self {
        let template_id = template_id.into();
        Self {
            id: Some(template_id.clone()),
            template_id: Some(template_id),
            ..Self::default()
        }
    }

    /// Get template id
    #[inline]
    #[must_use]
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
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
    pub fn with_template_id(&self, template_id: impl Into<String>) -> Self {
        Self {
            template_id: Some(template_id.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_parameters(&self, parameters: serde_json::Value) -> Self {
        Self {
            parameters: Some(parameters),
            ..self.clone()
        }
    }

    /// Validate against the context's templates
    ///
    /// # Errors
    /// Fails without id or template id, or when no template has that id.
    pub fn serialize(
        &self,
        context: &StructureContext,
        path: &[String],
        index: usize,
    ) -> Result<InitialValueTemplateItem, SerializeError> {
        let Some(id) = self.id.clone().filter(|id| !id.is_empty()) else {
            return Err(SerializeError::new(
                "`id` is required for initial value template item",
                path,
                PathSegment::Index(index),
                None,
            )
            .with_help_id(HelpId::IdRequired));
        };
        let Some(template_id) = self.template_id.clone() else {
            return Err(SerializeError::new(
                "template id (`templateId`) is required for initial value template item nodes",
                path,
                PathSegment::Id(id),
                None,
            )
            .with_help_id(HelpId::IdRequired));
        };
        let Some(template) = context.template(&template_id) else {
            return Err(SerializeError::new(
                format!("template \"{template_id}\" not found"),
                path,
                PathSegment::Id(id),
                None,
            ));
        };
        Ok(InitialValueTemplateItem {
            id,
            template_id,
            schema_type: template.schema_type.clone(),
            title: self.title.clone().or_else(|| Some(template.title.clone())),
            parameters: self.parameters.clone(),
        })
    }
}
