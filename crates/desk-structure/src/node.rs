//! Serialized pane nodes
//!
//! What builders turn into. Nodes are plain values: everything has been
//! validated, ids are final, and child resolvers are ready to be called by
//! the pane resolver.

use crate::intent::{type_names_from_filter, IntentChecker, IntentContext, IntentParams};
use crate::unresolved::UnresolvedPaneNode;
use desk_schema::{I18nTitle, SortOrderingItem};
use indexmap::IndexMap;
use serde::Serialize;

/// Layout used to render list entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Default,
    Card,
    Media,
    Detail,
    Block,
}

/// Intent target of a menu item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemIntent {
    #[serde(rename = "type")]
    pub intent_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<IntentParams>,
}

/// Entry in a pane's menu
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<MenuItemIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    pub show_as_action: bool,
}

/// Named group of menu items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemGroup {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nTitle>,
}

/// Initial value template offered when creating documents from a pane
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialValueTemplateItem {
    pub id: String,
    pub template_id: String,
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Fields shared by every pane kind
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneCommon {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nTitle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub menu_items: Vec<MenuItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub menu_item_groups: Vec<MenuItemGroup>,
}

/// Entry of a list pane
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ListEntry {
    ListItem(ListItem),
    Divider(Divider),
}

impl ListEntry {
    /// Entry id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::ListItem(item) => &item.id,
            Self::Divider(divider) => &divider.id,
        }
    }

    /// The item, unless this is a divider
    #[inline]
    #[must_use]
    pub fn as_item(&self) -> Option<&ListItem> {
        match self {
            Self::ListItem(item) => Some(item),
            Self::Divider(_) => None,
        }
    }
}

/// Visual separator between list items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divider {
    pub id: String,
}

/// Navigable list entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip)]
    pub child: Option<UnresolvedPaneNode>,
}

/// Pane listing fixed items
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNode {
    #[serde(flatten)]
    pub common: PaneCommon,
    pub items: Vec<ListEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<Layout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub initial_value_templates: Vec<InitialValueTemplateItem>,
    #[serde(skip)]
    pub child: UnresolvedPaneNode,
    #[serde(skip)]
    pub can_handle_intent: IntentChecker,
}

impl ListNode {
    /// Non-divider items in declaration order
    pub fn list_items(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter().filter_map(ListEntry::as_item)
    }
}

/// Query options of a document list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListOptions {
    pub filter: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, serde_json::Value>,
    pub api_version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default_ordering: Vec<SortOrderingItem>,
}

/// Pane listing documents matched by a filter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListNode {
    #[serde(flatten)]
    pub common: PaneCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type_name: Option<String>,
    pub options: DocumentListOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<Layout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub initial_value_templates: Vec<InitialValueTemplateItem>,
    #[serde(skip)]
    pub child: UnresolvedPaneNode,
    #[serde(skip)]
    pub can_handle_intent: IntentChecker,
}

/// Which document a document pane edits
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_parameters: Option<serde_json::Value>,
}

/// One way of presenting a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum View {
    Form {
        id: String,
        title: String,
    },
    Component {
        id: String,
        title: String,
        component: String,
        #[serde(skip_serializing_if = "serde_json::Value::is_null")]
        options: serde_json::Value,
    },
}

impl View {
    /// View id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Form { id, .. } | Self::Component { id, .. } => id,
        }
    }
}

/// Pane editing one document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    #[serde(flatten)]
    pub common: PaneCommon,
    pub options: DocumentOptions,
    pub views: Vec<View>,
    /// View ids opened side by side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_panes: Option<Vec<String>>,
}

impl DocumentNode {
    /// Check if a view with this id exists
    #[must_use]
    pub fn has_view(&self, id: &str) -> bool {
        self.views.iter().any(|view| view.id() == id)
    }
}

/// Pane rendered by a user-supplied component
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    #[serde(flatten)]
    pub common: PaneCommon,
    /// Name the renderer looks the component up by
    pub component: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
    #[serde(skip)]
    pub child: Option<UnresolvedPaneNode>,
    #[serde(skip)]
    pub can_handle_intent: Option<IntentChecker>,
}

/// Resolved pane
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaneNode {
    List(ListNode),
    DocumentList(DocumentListNode),
    Document(DocumentNode),
    Component(ComponentNode),
}

impl PaneNode {
    fn common(&self) -> &PaneCommon {
        match self {
            Self::List(node) => &node.common,
            Self::DocumentList(node) => &node.common,
            Self::Document(node) => &node.common,
            Self::Component(node) => &node.common,
        }
    }

    /// Get pane id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.common().id
    }

    /// Get display title
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.common().title.as_deref()
    }

    /// Get menu items
    #[inline]
    #[must_use]
    pub fn menu_items(&self) -> &[MenuItem] {
        &self.common().menu_items
    }

    /// Get menu item groups
    #[inline]
    #[must_use]
    pub fn menu_item_groups(&self) -> &[MenuItemGroup] {
        &self.common().menu_item_groups
    }

    /// Kind name as used in serialized output
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::DocumentList(_) => "documentList",
            Self::Document(_) => "document",
            Self::Component(_) => "component",
        }
    }

    /// Initial value templates offered by list panes
    #[must_use]
    pub fn initial_value_templates(&self) -> &[InitialValueTemplateItem] {
        match self {
            Self::List(node) => &node.initial_value_templates,
            Self::DocumentList(node) => &node.initial_value_templates,
            Self::Document(_) | Self::Component(_) => &[],
        }
    }

    /// Schema type names this pane shows
    ///
    /// The explicit schema type wins over names extracted from the filter.
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        match self {
            Self::DocumentList(node) => match &node.schema_type_name {
                Some(name) => vec![name.clone()],
                None => type_names_from_filter(&node.options.filter, &node.options.params),
            },
            Self::Document(node) => vec![node.options.type_name.clone()],
            Self::List(_) | Self::Component(_) => Vec::new(),
        }
    }

    /// Resolver for this pane's children, if it has any
    #[must_use]
    pub fn child(&self) -> Option<&UnresolvedPaneNode> {
        match self {
            Self::List(node) => Some(&node.child),
            Self::DocumentList(node) => Some(&node.child),
            Self::Component(node) => node.child.as_ref(),
            Self::Document(_) => None,
        }
    }

    /// Ask the pane's intent check, if it has one
    #[must_use]
    pub fn can_handle_intent(&self, intent: &str, params: &IntentParams, index: usize) -> bool {
        let checker = match self {
            Self::List(node) => Some(&node.can_handle_intent),
            Self::DocumentList(node) => Some(&node.can_handle_intent),
            Self::Component(node) => node.can_handle_intent.as_ref(),
            Self::Document(_) => None,
        };
        checker.is_some_and(|checker| checker.check(intent, params, IntentContext { pane: self, index }))
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            Self::List(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_document_list(&self) -> Option<&DocumentListNode> {
        match self {
            Self::DocumentList(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_document(&self) -> Option<&DocumentNode> {
        match self {
            Self::Document(node) => Some(node),
            _ => None,
        }
    }
}
