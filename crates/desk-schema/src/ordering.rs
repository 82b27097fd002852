//! Sort orderings
//!
//! Document types can declare named default sort configurations. Two
//! defaults (last edited, created) are offered for every type.

use crate::i18n::I18nTitle;
use crate::projection::{resolve_field_type, type_extends};
use crate::types::{JsonType, Schema, SchemaType};
use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Comparison function applied to a field before sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapWith {
    /// Compare as timestamps
    DateTime,
    /// Compare case-insensitively
    Lower,
}

/// One sort clause
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOrderingItem {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_with: Option<MapWith>,
}

impl SortOrderingItem {
    /// Ascending clause
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
            map_with: None,
        }
    }

    /// Descending clause
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
            map_with: None,
        }
    }

    /// With comparison function
    #[must_use]
    pub fn with_map_with(mut self, map_with: MapWith) -> Self {
        self.map_with = Some(map_with);
        self
    }
}

/// Named sort configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOrdering {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nTitle>,
    #[serde(default)]
    pub by: Vec<SortOrderingItem>,
}

impl SortOrdering {
    /// Create ordering without clauses
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            i18n: None,
            by: Vec::new(),
        }
    }

    /// With an additional clause
    #[must_use]
    pub fn with_by(mut self, item: SortOrderingItem) -> Self {
        self.by.push(item);
        self
    }

    /// With localized title
    #[must_use]
    pub fn with_i18n(mut self, i18n: I18nTitle) -> Self {
        self.i18n = Some(i18n);
        self
    }
}

const STRUCTURE_NS: &str = "structure";

/// Orderings offered for every document type, after its own
#[must_use]
pub fn default_ordering_options() -> Vec<SortOrdering> {
    vec![
        SortOrdering::new("lastEditedDesc", "Last edited")
            .with_i18n(I18nTitle::new("menu-items.sort-by.last-edited", STRUCTURE_NS))
            .with_by(SortOrderingItem::desc("_updatedAt")),
        SortOrdering::new("lastCreatedDesc", "Created")
            .with_i18n(I18nTitle::new("menu-items.sort-by.created", STRUCTURE_NS))
            .with_by(SortOrderingItem::desc("_createdAt")),
    ]
}

/// Ordering selected when a list does not specify one
#[must_use]
pub fn default_selected_ordering() -> SortOrdering {
    SortOrdering::new("lastEditedDesc", "Last edited")
        .with_i18n(I18nTitle::new("menu-items.sort-by.last-edited", STRUCTURE_NS))
        .with_by(SortOrderingItem::desc("_updatedAt"))
}

/// Tag each clause with the comparison function its field type calls for
///
/// Date-like fields compare as timestamps, other string fields compare
/// lowercased. Clauses that already carry a function, or whose field type
/// cannot be resolved statically, are left alone.
#[must_use]
pub fn apply_ordering_functions(
    schema: &Schema,
    ordering: &SortOrdering,
    schema_type: &SchemaType,
) -> SortOrdering {
    let by = ordering
        .by
        .iter()
        .map(|item| {
            if item.map_with.is_some() {
                return item.clone();
            }
            let Some(field_type) = resolve_field_type(schema, schema_type, &item.field) else {
                return item.clone();
            };
            if type_extends(&field_type, "datetime") {
                item.clone().with_map_with(MapWith::DateTime)
            } else if field_type.json_type() == JsonType::String {
                item.clone().with_map_with(MapWith::Lower)
            } else {
                item.clone()
            }
        })
        .collect();

    SortOrdering {
        by,
        ..ordering.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDef;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::compile([
            TypeDef::named("publishedAt", "datetime"),
            TypeDef::named("book", "document")
                .with_field(TypeDef::named("title", "string"))
                .with_field(TypeDef::named("pages", "number"))
                .with_field(TypeDef::named("released", "publishedAt"))
                .with_field(TypeDef::named("summary", "text")),
        ])
        .unwrap()
    }

    #[test]
    fn defaults_sort_by_timestamps_descending() {
        let defaults = default_ordering_options();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults[0].by, vec![SortOrderingItem::desc("_updatedAt")]);
        assert_eq!(defaults[1].by, vec![SortOrderingItem::desc("_createdAt")]);
        assert_eq!(default_selected_ordering(), defaults[0]);
    }

    #[test]
    fn maps_dates_strings_and_leaves_numbers() {
        let schema = schema();
        let book = schema.get("book").unwrap();
        let ordering = SortOrdering::new("mixed", "Mixed")
            .with_by(SortOrderingItem::asc("title"))
            .with_by(SortOrderingItem::asc("pages"))
            .with_by(SortOrderingItem::desc("released"))
            .with_by(SortOrderingItem::asc("summary"));

        let mapped = apply_ordering_functions(&schema, &ordering, &book);
        let functions: Vec<_> = mapped.by.iter().map(|item| item.map_with).collect();
        assert_eq!(
            functions,
            vec![
                Some(MapWith::Lower),
                None,
                Some(MapWith::DateTime),
                Some(MapWith::Lower)
            ]
        );
    }

    #[test]
    fn keeps_existing_functions_and_unknown_fields() {
        let schema = schema();
        let book = schema.get("book").unwrap();
        let ordering = SortOrdering::new("custom", "Custom")
            .with_by(SortOrderingItem::asc("title").with_map_with(MapWith::DateTime))
            .with_by(SortOrderingItem::asc("missing"));

        let mapped = apply_ordering_functions(&schema, &ordering, &book);
        assert_eq!(mapped.by[0].map_with, Some(MapWith::DateTime));
        assert_eq!(mapped.by[1].map_with, None);
        assert_eq!(mapped.name, "custom");
    }

    #[test]
    fn serializes_in_camel_case() {
        let item = SortOrderingItem::desc("_updatedAt").with_map_with(MapWith::DateTime);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"field": "_updatedAt", "direction": "desc", "mapWith": "dateTime"})
        );
    }
}
