use super::{serialize_menu_item_groups, serialize_menu_items, MenuItemBuilder, MenuItemGroupBuilder};
use super::{SerializeOptions, SerializePane};
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::id::{structure_node_id, validate_id};
use crate::intent::IntentChecker;
use crate::node::{ComponentNode, PaneCommon, PaneNode};
use crate::unresolved::UnresolvedPaneNode;
use desk_schema::I18nTitle;
use im::Vector;

/// Builder for a pane rendered by a user-supplied component
#[derive(Debug, Clone, Default)]
pub struct ComponentBuilder {
    id: Option<String>,
    title: Option<String>,
    i18n: Option<I18nTitle>,
    component: Option<String>,
    options: serde_json::Value,
    child: Option<UnresolvedPaneNode>,
    can_handle_intent: Option<IntentChecker>,
    menu_items: Vector<MenuItemBuilder>,
    menu_item_groups: Vector<MenuItemGroupBuilder>,
}

impl ComponentBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

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

    #[must_use]
    pub fn with_i18n(&self, i18n: I18nTitle) -> Self {
        Self {
            i18n: Some(i18n),
            ..self.clone()
        }
    }

    /// With name the renderer looks the component up by
    #[must_use]
    pub fn with_component(&self, component: impl Into<String>) -> Self {
        Self {
            component: Some(component.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_options(&self, options: serde_json::Value) -> Self {
        Self {
            options,
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

    #[must_use]
    pub fn with_can_handle_intent(&self, checker: IntentChecker) -> Self {
        Self {
            can_handle_intent: Some(checker),
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

    #[must_use]
    pub fn with_menu_item_groups(&self, groups: impl IntoIterator<Item = MenuItemGroupBuilder>) -> Self {
        Self {
            menu_item_groups: groups.into_iter().collect(),
            ..self.clone()
        }
    }
}

impl SerializePane for ComponentBuilder {
    fn serialize(&self, options: &SerializeOptions) -> Result<PaneNode, SerializeError> {
        let Some(id) = structure_node_id(self.id.as_deref(), self.title.as_deref()) else {
            return Err(SerializeError::new(
                "`id` is required for `component` structure item",
                &options.path,
                PathSegment::of(None, options.index),
                options.hint(),
            )
            .with_help_id(HelpId::IdRequired));
        };
        validate_id(&id, &options.path, PathSegment::Id(id.clone()))?;

        let Some(component) = self.component.clone().filter(|c| !c.is_empty()) else {
            return Err(SerializeError::new(
                "`component` is required for `component` structure item",
                &options.path,
                PathSegment::Id(id),
                options.hint(),
            ));
        };

        let path = options.child_path(&id);
        Ok(PaneNode::Component(ComponentNode {
            common: PaneCommon {
                id,
                title: self.title.clone(),
                i18n: self.i18n.clone(),
                menu_items: serialize_menu_items(&self.menu_items, &path)?,
                menu_item_groups: serialize_menu_item_groups(&self.menu_item_groups, &path)?,
            },
            component,
            options: self.options.clone(),
            child: self.child.clone(),
            can_handle_intent: self.can_handle_intent.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentParams;

    #[test]
    fn id_and_component_are_required() {
        let err = ComponentBuilder::new()
            .with_component("Preview")
            .serialize(&SerializeOptions::default().with_index(0))
            .unwrap_err();
        assert_eq!(err.message(), "`id` is required for `component` structure item");

        let err = ComponentBuilder::new()
            .with_id("preview")
            .serialize(&SerializeOptions::default())
            .unwrap_err();
        assert_eq!(err.message(), "`component` is required for `component` structure item");
        assert_eq!(err.path(), ["preview"]);
    }

    #[test]
    fn intent_check_is_opt_in() {
        let plain = ComponentBuilder::new()
            .with_id("c")
            .with_component("Widget")
            .serialize(&SerializeOptions::default())
            .unwrap();
        let params = IntentParams::new().with("id", "a").with("type", "book");
        assert!(!plain.can_handle_intent("edit", &params, 1));

        let eager = ComponentBuilder::new()
            .with_id("c")
            .with_component("Widget")
            .with_can_handle_intent(IntentChecker::always())
            .serialize(&SerializeOptions::default())
            .unwrap();
        assert!(eager.can_handle_intent("edit", &params, 1));
    }
}
