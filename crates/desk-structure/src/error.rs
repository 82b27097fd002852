//! Error types for structure building
//!
//! Provides error handling for:
//! - Serialization (builder → pane node), attributed to a tree path
//! - User resolver functions failing or producing nothing

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Help reference attached to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelpId {
    #[serde(rename = "structure-node-id-required")]
    IdRequired,
    #[serde(rename = "structure-title-required")]
    TitleRequired,
    #[serde(rename = "structure-filter-required")]
    FilterRequired,
    #[serde(rename = "structure-schema-type-required")]
    SchemaTypeRequired,
    #[serde(rename = "structure-schema-type-not-found")]
    SchemaTypeNotFound,
    #[serde(rename = "structure-document-id-required")]
    DocumentIdRequired,
    #[serde(rename = "structure-document-type-required")]
    DocumentTypeRequired,
    #[serde(rename = "structure-view-component-required")]
    ViewComponentRequired,
    #[serde(rename = "structure-query-provided-for-filter")]
    QueryProvidedForFilter,
    #[serde(rename = "structure-action-or-intent-required")]
    ActionOrIntentRequired,
    #[serde(rename = "structure-action-and-intent-mutually-exclusive")]
    ActionAndIntentMutuallyExclusive,
    #[serde(rename = "structure-list-item-ids-must-be-unique")]
    ListItemIdsMustBeUnique,
    #[serde(rename = "structure-item-returned-no-child")]
    ItemReturnedNoChild,
    #[serde(rename = "structure-invalid-node-id")]
    InvalidNodeId,
}

impl HelpId {
    /// Stable reference string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdRequired => "structure-node-id-required",
            Self::TitleRequired => "structure-title-required",
            Self::FilterRequired => "structure-filter-required",
            Self::SchemaTypeRequired => "structure-schema-type-required",
            Self::SchemaTypeNotFound => "structure-schema-type-not-found",
            Self::DocumentIdRequired => "structure-document-id-required",
            Self::DocumentTypeRequired => "structure-document-type-required",
            Self::ViewComponentRequired => "structure-view-component-required",
            Self::QueryProvidedForFilter => "structure-query-provided-for-filter",
            Self::ActionOrIntentRequired => "structure-action-or-intent-required",
            Self::ActionAndIntentMutuallyExclusive => {
                "structure-action-and-intent-mutually-exclusive"
            }
            Self::ListItemIdsMustBeUnique => "structure-list-item-ids-must-be-unique",
            Self::ItemReturnedNoChild => "structure-item-returned-no-child",
            Self::InvalidNodeId => "structure-invalid-node-id",
        }
    }
}

impl Display for HelpId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a node among its parent's children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Id(String),
    Index(usize),
    Unknown,
}

impl PathSegment {
    /// Prefer the id, fall back to the index
    #[must_use]
    pub fn of(id: Option<&str>, index: Option<usize>) -> Self {
        match (id, index) {
            (Some(id), _) if !id.is_empty() => Self::Id(id.to_string()),
            (_, Some(index)) => Self::Index(index),
            _ => Self::Unknown,
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Index(index) => write!(f, "{index}"),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Validation failure while turning a builder into a pane node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SerializeError {
    message: String,
    path: Vec<String>,
    help_id: Option<HelpId>,
}

impl SerializeError {
    /// Create error located at `segment` below `parent_path`
    pub fn new(
        message: impl Into<String>,
        parent_path: &[String],
        segment: PathSegment,
        hint: Option<&str>,
    ) -> Self {
        let segment = match hint {
            Some(hint) => format!("{segment} ({hint})"),
            None => segment.to_string(),
        };
        let mut path = parent_path.to_vec();
        path.push(segment);
        Self {
            message: message.into(),
            path,
            help_id: None,
        }
    }

    /// With help reference
    #[must_use]
    pub fn with_help_id(mut self, help_id: HelpId) -> Self {
        self.help_id = Some(help_id);
        self
    }

    /// Get message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get tree path, ending in the offending segment
    #[inline]
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Get help reference
    #[inline]
    #[must_use]
    pub fn help_id(&self) -> Option<HelpId> {
        self.help_id
    }
}

/// Anything a pane can fail with while being resolved
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// Builder validation failed
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// User-supplied resolver function failed
    #[error("{message}")]
    Resolver {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resolver produced nothing
    #[error("Pane returned no child")]
    NoChild,
}

impl StructureError {
    /// Create resolver failure from a message
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver {
            message: message.into(),
            source: None,
        }
    }

    /// Create resolver failure wrapping another error
    pub fn resolver_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Resolver {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Help reference, if the failure carries one
    #[must_use]
    pub fn help_id(&self) -> Option<HelpId> {
        match self {
            Self::Serialize(err) => err.help_id(),
            Self::Resolver { .. } => None,
            Self::NoChild => Some(HelpId::ItemReturnedNoChild),
        }
    }

    /// Underlying serialization error, if any
    #[must_use]
    pub fn as_serialize(&self) -> Option<&SerializeError> {
        match self {
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_ends_in_segment_with_hint() {
        let parent = vec!["root".to_string()];
        let err = SerializeError::new(
            "`title` is required for list items",
            &parent,
            PathSegment::Id("books".into()),
            Some("listItem"),
        );
        assert_eq!(err.path(), ["root", "books (listItem)"]);
        assert_eq!(err.to_string(), "`title` is required for list items");
    }

    #[test]
    fn segment_falls_back_to_index_then_unknown() {
        assert_eq!(PathSegment::of(None, Some(3)).to_string(), "3");
        assert_eq!(PathSegment::of(Some(""), Some(3)).to_string(), "3");
        assert_eq!(PathSegment::of(None, None).to_string(), "<unknown>");
        assert_eq!(PathSegment::of(Some("a"), Some(3)).to_string(), "a");
    }

    #[test]
    fn help_ids_flow_through_structure_errors() {
        let err: StructureError = SerializeError::new("x", &[], PathSegment::Unknown, None)
            .with_help_id(HelpId::IdRequired)
            .into();
        assert_eq!(err.help_id(), Some(HelpId::IdRequired));
        assert_eq!(StructureError::NoChild.help_id(), Some(HelpId::ItemReturnedNoChild));
        assert_eq!(StructureError::resolver("boom").help_id(), None);
    }

    #[test]
    fn help_id_serializes_as_reference_string() {
        let json = serde_json::to_string(&HelpId::ListItemIdsMustBeUnique).unwrap();
        assert_eq!(json, "\"structure-list-item-ids-must-be-unique\"");
        assert_eq!(HelpId::ListItemIdsMustBeUnique.as_str(), "structure-list-item-ids-must-be-unique");
    }
}
