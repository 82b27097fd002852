use crate::error::{HelpId, PathSegment, SerializeError};
use crate::intent::IntentParams;
use crate::node::{MenuItem, MenuItemIntent};
use desk_schema::I18nTitle;

/// Builder for a pane menu entry
///
/// An entry either triggers an `action` or dispatches an `intent`, never both.
#[derive(Debug, Clone, Default)]
pub struct MenuItemBuilder {
    title: Option<String>,
    i18n: Option<I18nTitle>,
    action: Option<String>,
    intent: Option<MenuItemIntent>,
    group: Option<String>,
    params: Option<serde_json::Value>,
    show_as_action: bool,
}

impl MenuItemBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get title
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Get action name
    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
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

    #[must_use]
    pub fn with_action(&self, action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..self.clone()
        }
    }

    /// With intent dispatched on click
    #[must_use]
    pub fn with_intent(&self, intent_type: impl Into<String>, params: Option<IntentParams>) -> Self {
        Self {
            intent: Some(MenuItemIntent {
                intent_type: intent_type.into(),
                params,
            }),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_group(&self, group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_params(&self, params: serde_json::Value) -> Self {
        Self {
            params: Some(params),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_show_as_action(&self, show: bool) -> Self {
        Self {
            show_as_action: show,
            ..self.clone()
        }
    }

    /// Validate and produce the menu item at `index` below `path`
    ///
    /// # Errors
    /// Fails without title, without either action or intent, or with both.
    pub fn serialize(&self, path: &[String], index: usize) -> Result<MenuItem, SerializeError> {
        let Some(title) = self.title.clone() else {
            let hint = self.action.as_ref().map(|action| format!("action: \"{action}\""));
            return Err(SerializeError::new(
                "`title` is required for menu item",
                path,
                PathSegment::Index(index),
                hint.as_deref(),
            )
            .with_help_id(HelpId::TitleRequired));
        };

        match (&self.action, &self.intent) {
            (None, None) => Err(SerializeError::new(
                format!("`action` or `intent` required for menu item with title {title}"),
                path,
                PathSegment::Index(index),
                Some(&format!("\"{title}\"")),
            )
            .with_help_id(HelpId::ActionOrIntentRequired)),
            (Some(_), Some(_)) => Err(SerializeError::new(
                "cannot set both `action` AND `intent`",
                path,
                PathSegment::Index(index),
                Some(&format!("\"{title}\"")),
            )
            .with_help_id(HelpId::ActionAndIntentMutuallyExclusive)),
            _ => Ok(MenuItem {
                title,
                i18n: self.i18n.clone(),
                action: self.action.clone(),
                intent: self.intent.clone(),
                group: self.group.clone(),
                params: self.params.clone(),
                show_as_action: self.show_as_action,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<String> {
        vec!["root".to_string(), "books".to_string()]
    }

    #[test]
    fn action_item_serializes() {
        let item = MenuItemBuilder::new()
            .with_title("Compact view")
            .with_action("setLayout")
            .with_group("layout")
            .serialize(&path(), 0)
            .unwrap();
        assert_eq!(item.action.as_deref(), Some("setLayout"));
        assert_eq!(item.group.as_deref(), Some("layout"));
        assert!(!item.show_as_action);
    }

    #[test]
    fn title_is_required() {
        let err = MenuItemBuilder::new().with_action("refresh").serialize(&path(), 2).unwrap_err();
        assert_eq!(err.message(), "`title` is required for menu item");
        assert_eq!(err.path(), ["root", "books", "2 (action: \"refresh\")"]);
    }

    #[test]
    fn needs_action_or_intent() {
        let err = MenuItemBuilder::new().with_title("Nothing").serialize(&path(), 0).unwrap_err();
        assert_eq!(err.message(), "`action` or `intent` required for menu item with title Nothing");
        assert_eq!(err.help_id(), Some(HelpId::ActionOrIntentRequired));
    }

    #[test]
    fn action_and_intent_are_exclusive() {
        let err = MenuItemBuilder::new()
            .with_title("Both")
            .with_action("x")
            .with_intent("create", Some(IntentParams::new().with("type", "book")))
            .serialize(&path(), 0)
            .unwrap_err();
        assert_eq!(err.message(), "cannot set both `action` AND `intent`");
    }
}
