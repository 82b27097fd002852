use crate::error::{HelpId, PathSegment, SerializeError};
use crate::node::MenuItemGroup;
use desk_schema::I18nTitle;

/// Builder for a named group of menu items
#[derive(Debug, Clone, Default)]
pub struct MenuItemGroupBuilder {
    id: Option<String>,
    title: Option<String>,
    i18n: Option<I18nTitle>,
}

impl MenuItemGroupBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get id
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

    /// Validate and produce the group at `index` below `path`
    ///
    /// # Errors
    /// Fails without id or title.
    pub fn serialize(&self, path: &[String], index: usize) -> Result<MenuItemGroup, SerializeError> {
        let Some(id) = self.id.clone() else {
            return Err(SerializeError::new(
                "`id` is required for a menu item group",
                path,
                PathSegment::Index(index),
                self.title.as_deref(),
            )
            .with_help_id(HelpId::IdRequired));
        };
        let Some(title) = self.title.clone() else {
            return Err(SerializeError::new(
                "`title` is required for a menu item group",
                path,
                PathSegment::Id(id),
                None,
            )
            .with_help_id(HelpId::TitleRequired));
        };
        Ok(MenuItemGroup {
            id,
            title,
            i18n: self.i18n.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_and_title_are_required() {
        let err = MenuItemGroupBuilder::new().with_title("Sort").serialize(&[], 1).unwrap_err();
        assert_eq!(err.message(), "`id` is required for a menu item group");
        assert_eq!(err.path(), ["1 (Sort)"]);

        let err = MenuItemGroupBuilder::new().with_id("sorting").serialize(&[], 1).unwrap_err();
        assert_eq!(err.message(), "`title` is required for a menu item group");
        assert_eq!(err.path(), ["sorting"]);
    }
}
