use crate::error::{HelpId, PathSegment, SerializeError};
use crate::id::{structure_node_id, validate_id};
use crate::node::View;

#[derive(Debug, Clone, PartialEq)]
enum ViewKind {
    Form,
    Component {
        component: Option<String>,
        options: serde_json::Value,
    },
}

/// Builder for one document view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBuilder {
    id: Option<String>,
    title: Option<String>,
    kind: ViewKind,
}

impl ViewBuilder {
    /// Get explicit id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
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

    /// With component name, component views only
    #[must_use]
    pub fn with_component(&self, component: impl Into<String>) -> Self {
        let mut next = self.clone();
        if let ViewKind::Component { component: slot, .. } = &mut next.kind {
            *slot = Some(component.into());
        }
        next
    }

    /// With options passed to the component, component views only
    #[must_use]
    pub fn with_options(&self, options: serde_json::Value) -> Self {
        let mut next = self.clone();
        if let ViewKind::Component { options: slot, .. } = &mut next.kind {
            *slot = options;
        }
        next
    }

    /// Validate and produce the view at `index` below `path`
    ///
    /// # Errors
    /// Fails without id or title, or for a component view without component.
    pub fn serialize(&self, path: &[String], index: usize) -> Result<View, SerializeError> {
        let Some(id) = structure_node_id(self.id.as_deref(), self.title.as_deref()) else {
            return Err(SerializeError::new(
                "`id` is required for view item",
                path,
                PathSegment::Index(index),
                self.title.as_deref(),
            )
            .with_help_id(HelpId::IdRequired));
        };
        validate_id(&id, path, PathSegment::Index(index))?;
        let Some(title) = self.title.clone() else {
            return Err(SerializeError::new(
                "`title` is required for view item",
                path,
                PathSegment::Id(id),
                None,
            )
            .with_help_id(HelpId::TitleRequired));
        };

        match &self.kind {
            ViewKind::Form => Ok(View::Form { id, title }),
            ViewKind::Component { component, options } => {
                let Some(component) = component.clone().filter(|c| !c.is_empty()) else {
                    return Err(SerializeError::new(
                        "`component` is required for component view item",
                        path,
                        PathSegment::Id(id),
                        None,
                    )
                    .with_help_id(HelpId::ViewComponentRequired));
                };
                Ok(View::Component {
                    id,
                    title,
                    component,
                    options: options.clone(),
                })
            }
        }
    }
}

/// Creates view builders
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewFactory;

impl ViewFactory {
    /// Form editor, id `editor` and title `Editor` unless changed
    #[must_use]
    pub fn form(&self) -> ViewBuilder {
        ViewBuilder {
            id: Some("editor".to_string()),
            title: Some("Editor".to_string()),
            kind: ViewKind::Form,
        }
    }

    /// View rendered by the named component
    #[must_use]
    pub fn component(&self, component: impl Into<String>) -> ViewBuilder {
        ViewBuilder {
            id: None,
            title: None,
            kind: ViewKind::Component {
                component: Some(component.into()),
                options: serde_json::Value::Null,
            },
        }
    }
}
