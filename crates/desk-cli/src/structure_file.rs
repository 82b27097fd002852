//! Declarative structure trees
//!
//! Desk files describe panes as plain data tagged by `kind`. They are turned
//! into the same builders hand-written structures use, so every node goes
//! through the usual validation when it is resolved.

use desk_structure::{
    DocumentBuilder, DocumentNodeOptions, ListEntryBuilder, StructureBuilder, UnresolvedPaneNode, ViewBuilder,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Failure turning a declarative tree into builders
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureFileError {
    #[error("`{kind}` cannot be a list entry")]
    NotAListEntry { kind: &'static str },

    #[error("`{kind}` is a list entry and cannot be used as a pane")]
    NotAPane { kind: &'static str },
}

/// View of a document pane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Renders a component view when set, a form view otherwise
    pub component: Option<String>,
}

impl ViewSpec {
    fn to_builder(&self, s: &StructureBuilder) -> ViewBuilder {
        let view = match &self.component {
            Some(component) => s.view().component(component.as_str()),
            None => s.view().form(),
        };
        let view = set(view, self.id.as_deref(), |v, id| v.with_id(id));
        set(view, self.title.as_deref(), |v, title| v.with_title(title))
    }
}

/// Default document node settings for one schema type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentNodeSpec {
    pub views: Vec<ViewSpec>,
    pub default_panes: Option<Vec<String>>,
}

impl DocumentNodeSpec {
    /// Document builder with these views and default panes
    #[must_use]
    pub fn to_builder(&self, s: &StructureBuilder) -> DocumentBuilder {
        let mut document = s.document();
        if !self.views.is_empty() {
            document = document.with_views(self.views.iter().map(|view| view.to_builder(s)));
        }
        set(document, self.default_panes.clone(), |d, panes| d.with_default_panes(panes))
    }
}

/// Default document node hook serving `specs` by schema type
pub fn document_node_hook(
    specs: IndexMap<String, DocumentNodeSpec>,
) -> impl Fn(&StructureBuilder, &DocumentNodeOptions) -> Option<DocumentBuilder> + Send + Sync + 'static {
    move |s: &StructureBuilder, options: &DocumentNodeOptions| {
        specs.get(&options.schema_type).map(|spec| spec.to_builder(s))
    }
}

/// Declarative pane or list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeSpec {
    List {
        id: Option<String>,
        title: Option<String>,
        #[serde(default)]
        items: Vec<NodeSpec>,
    },
    ListItem {
        id: Option<String>,
        title: Option<String>,
        schema_type: Option<String>,
        child: Option<Box<NodeSpec>>,
    },
    DocumentListItem {
        id: Option<String>,
        title: Option<String>,
        schema_type: Option<String>,
    },
    DocumentTypeListItem {
        schema_type: String,
        id: Option<String>,
    },
    DocumentTypeList {
        schema_type: String,
    },
    DocumentList {
        id: Option<String>,
        title: Option<String>,
        filter: Option<String>,
        #[serde(default)]
        params: IndexMap<String, serde_json::Value>,
        api_version: Option<String>,
        schema_type: Option<String>,
    },
    Document {
        id: Option<String>,
        title: Option<String>,
        document_id: Option<String>,
        schema_type: Option<String>,
        #[serde(default)]
        views: Vec<ViewSpec>,
        default_panes: Option<Vec<String>>,
    },
    Component {
        id: Option<String>,
        title: Option<String>,
        component: Option<String>,
    },
    Divider,
}

impl NodeSpec {
    /// Kind name as written in desk files
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::ListItem { .. } => "listItem",
            Self::DocumentListItem { .. } => "documentListItem",
            Self::DocumentTypeListItem { .. } => "documentTypeListItem",
            Self::DocumentTypeList { .. } => "documentTypeList",
            Self::DocumentList { .. } => "documentList",
            Self::Document { .. } => "document",
            Self::Component { .. } => "component",
            Self::Divider => "divider",
        }
    }

    /// Pane builder for this node
    ///
    /// # Errors
    /// Fails when this node, or a node below it, sits where it cannot.
    pub fn to_pane(&self, s: &StructureBuilder) -> Result<UnresolvedPaneNode, StructureFileError> {
        let pane: UnresolvedPaneNode = match self {
            Self::List { id, title, items } => {
                let entries = items
                    .iter()
                    .map(|item| item.to_list_entry(s))
                    .collect::<Result<Vec<_>, _>>()?;
                let list = set(s.list(), id.as_deref(), |l, id| l.with_id(id));
                set(list, title.as_deref(), |l, title| l.with_title(title))
                    .with_items(entries)
                    .into()
            }
            Self::DocumentTypeList { schema_type } => s.document_type_list(schema_type).into(),
            Self::DocumentList {
                id,
                title,
                filter,
                params,
                api_version,
                schema_type,
            } => {
                let list = set(s.document_list(), id.as_deref(), |l, id| l.with_id(id));
                let list = set(list, title.as_deref(), |l, title| l.with_title(title));
                let list = set(list, filter.as_deref(), |l, filter| l.with_filter(filter));
                let list = set(list, api_version.as_deref(), |l, version| l.with_api_version(version));
                set(list, schema_type.as_deref(), |l, name| l.with_schema_type(name))
                    .with_params(params.clone())
                    .into()
            }
            Self::Document {
                id,
                title,
                document_id,
                schema_type,
                views,
                default_panes,
            } => {
                let spec = DocumentNodeSpec {
                    views: views.clone(),
                    default_panes: default_panes.clone(),
                };
                let document = set(spec.to_builder(s), id.as_deref(), |d, id| d.with_id(id));
                let document = set(document, title.as_deref(), |d, title| d.with_title(title));
                let document = set(document, document_id.as_deref(), |d, id| d.with_document_id(id));
                set(document, schema_type.as_deref(), |d, name| d.with_schema_type(name)).into()
            }
            Self::Component { id, title, component } => {
                let pane = set(s.component(), id.as_deref(), |c, id| c.with_id(id));
                let pane = set(pane, title.as_deref(), |c, title| c.with_title(title));
                set(pane, component.as_deref(), |c, name| c.with_component(name)).into()
            }
            Self::ListItem { .. } | Self::DocumentListItem { .. } | Self::DocumentTypeListItem { .. } | Self::Divider => {
                return Err(StructureFileError::NotAPane { kind: self.kind() })
            }
        };
        Ok(pane)
    }

    /// List entry builder for this node
    ///
    /// # Errors
    /// Fails for pane kinds, or when the entry's child cannot be a pane.
    pub fn to_list_entry(&self, s: &StructureBuilder) -> Result<ListEntryBuilder, StructureFileError> {
        let item = match self {
            Self::ListItem {
                id,
                title,
                schema_type,
                child,
            } => {
                let item = set(s.list_item(), id.as_deref(), |i, id| i.with_id(id));
                let item = set(item, title.as_deref(), |i, title| i.with_title(title));
                let item = set(item, schema_type.as_deref(), |i, name| i.with_schema_type(name));
                match child {
                    Some(child) => item.with_child(child.to_pane(s)?),
                    None => item,
                }
            }
            Self::DocumentListItem { id, title, schema_type } => {
                let item = set(s.document_list_item(), id.as_deref(), |i, id| i.with_id(id));
                let item = set(item, title.as_deref(), |i, title| i.with_title(title));
                set(item, schema_type.as_deref(), |i, name| i.with_schema_type(name))
            }
            Self::DocumentTypeListItem { schema_type, id } => {
                set(s.document_type_list_item(schema_type), id.as_deref(), |i, id| i.with_id(id))
            }
            Self::Divider => return Ok(s.divider()),
            Self::List { .. }
            | Self::DocumentTypeList { .. }
            | Self::DocumentList { .. }
            | Self::Document { .. }
            | Self::Component { .. } => return Err(StructureFileError::NotAListEntry { kind: self.kind() }),
        };
        Ok(item.into())
    }
}

fn set<B, T>(builder: B, value: Option<T>, setter: impl FnOnce(&B, T) -> B) -> B {
    match value {
        Some(value) => setter(&builder, value),
        None => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_schema::{Schema, TypeDef};
    use desk_structure::{SerializeOptions, SerializePane, StructureContext};
    use std::sync::Arc;

    fn structure() -> StructureBuilder {
        let schema = Schema::compile([
            TypeDef::named("book", "document").with_title("Book"),
            TypeDef::named("settings", "document"),
        ])
        .unwrap();
        StructureBuilder::new(Arc::new(StructureContext::new(Arc::new(schema))))
    }

    fn parse(yaml: &str) -> NodeSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn serialize(node: &UnresolvedPaneNode) -> desk_structure::PaneNode {
        match node {
            UnresolvedPaneNode::Builder(builder) => builder.serialize(&SerializeOptions::default()).unwrap(),
            other => panic!("expected a builder, got {other:?}"),
        }
    }

    #[test]
    fn builds_lists_with_every_entry_kind() {
        let spec = parse(
            r"
kind: list
id: content
title: Content
items:
  - kind: documentTypeListItem
    schemaType: book
  - kind: divider
  - kind: documentListItem
    id: settings
    title: Settings
    schemaType: settings
  - kind: listItem
    id: dashboard
    title: Dashboard
    child:
      kind: component
      id: dash
      component: Dashboard
",
        );
        let s = structure();
        let node = serialize(&spec.to_pane(&s).unwrap());
        let list = node.as_list().unwrap();
        let ids: Vec<_> = list.list_items().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["book", "settings", "dashboard"]);
        assert_eq!(list.items.len(), 4);
    }

    #[test]
    fn document_lists_keep_filter_and_params() {
        let spec = parse(
            r#"
kind: documentList
id: recent
title: Recent
filter: _type == $type && defined(title)
apiVersion: "2023-11-13"
params:
  type: book
"#,
        );
        let node = serialize(&spec.to_pane(&structure()).unwrap());
        let list = node.as_document_list().unwrap();
        assert_eq!(list.options.filter, "_type == $type && defined(title)");
        assert_eq!(list.options.params["type"], "book");
        assert_eq!(list.schema_type_name.as_deref(), Some("book"));
    }

    #[test]
    fn entries_and_panes_are_not_interchangeable() {
        let s = structure();
        let err = parse("kind: divider").to_pane(&s).unwrap_err();
        assert_eq!(err, StructureFileError::NotAPane { kind: "divider" });

        let list = parse("kind: list\nid: root\ntitle: Root\nitems:\n  - kind: documentTypeList\n    schemaType: book\n");
        let err = list.to_pane(&s).unwrap_err();
        assert_eq!(err.to_string(), "`documentTypeList` cannot be a list entry");
    }

    #[test]
    fn document_node_hook_serves_configured_types() {
        let specs: IndexMap<String, DocumentNodeSpec> = serde_yaml::from_str(
            r"
book:
  views:
    - id: editor
    - id: preview
      title: Preview
      component: BookPreview
  defaultPanes: [editor, preview]
",
        )
        .unwrap();
        let hook = document_node_hook(specs);
        let s = structure();

        let book = hook(&s, &DocumentNodeOptions::new("book")).unwrap();
        assert_eq!(book.views().len(), 2);
        assert!(hook(&s, &DocumentNodeOptions::new("settings")).is_none());
    }
}
