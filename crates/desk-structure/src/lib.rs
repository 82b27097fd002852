//! Desk Structure
//!
//! Immutable builders describing a desk as a tree of panes, and the plain
//! nodes they serialize into.
//!
//! # Core Concepts
//!
//! - [`StructureBuilder`]: factory for every builder, sharing one [`StructureContext`]
//! - [`SerializePane`]: validates a builder into a [`PaneNode`], failing with a
//!   path-attributed [`SerializeError`]
//! - [`UnresolvedPaneNode`]: a node, a builder, or a resolver function that
//!   answers now, later, or through a stream
//! - [`IntentChecker`]: predicate a pane uses to claim an intent
//!
//! # Example
//!
//! ```rust,ignore
//! use desk_structure::{SerializeOptions, SerializePane, StructureBuilder, StructureContext};
//!
//! let s = StructureBuilder::new(Arc::new(StructureContext::new(schema)));
//! let root = s
//!     .list()
//!     .with_title("Content")
//!     .with_items([s.document_type_list_item("book"), s.document_type_list_item("author")]);
//!
//! let node = root.serialize(&SerializeOptions::default())?;
//! assert_eq!(node.id(), "content");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod builder;
mod context;
mod error;
mod id;
mod intent;
mod node;
mod unresolved;

pub use builder::{
    document_child_resolver, resolve_child_for_item, ComponentBuilder, DocumentBuilder, DocumentListBuilder,
    InitialValueTemplateItemBuilder, ListBuilder, ListEntryBuilder, ListItemBuilder, MenuItemBuilder,
    MenuItemGroupBuilder, SerializeOptions, SerializePane, StructureBuilder, ViewBuilder, ViewFactory,
    DEFAULT_API_VERSION, LEGACY_API_VERSION,
};
pub use context::{
    published_id, DocumentNodeOptions, DocumentTypeLookup, InitialValueTemplate, StructureContext, DRAFTS_PREFIX,
};
pub use error::{HelpId, PathSegment, SerializeError, StructureError};
pub use id::{camel_case, deburr, slugify, start_case, structure_node_id, validate_id, EDIT_PREFIX};
pub use intent::{
    type_names_from_filter, IntentChecker, IntentContext, IntentParams, CREATE, DEFAULT_TYPE_FILTER, EDIT,
};
pub use node::{
    ComponentNode, Divider, DocumentListNode, DocumentListOptions, DocumentNode, DocumentOptions,
    InitialValueTemplateItem, Layout, ListEntry, ListItem, ListNode, MenuItem, MenuItemGroup, MenuItemIntent,
    PaneCommon, PaneNode, View,
};
pub use unresolved::{
    ChildResolver, ResolverOutput, ResolverResult, RouterPaneSiblingContext, UnresolvedPaneNode,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use desk_schema::{Schema, TypeDef};
    use std::sync::Arc;

    fn structure() -> StructureBuilder {
        let schema = Schema::compile([
            TypeDef::named("book", "document").with_field(TypeDef::named("title", "string")),
            TypeDef::named("author", "document"),
        ])
        .unwrap();
        StructureBuilder::new(Arc::new(StructureContext::new(Arc::new(schema))))
    }

    #[test]
    fn builders_are_reusable_templates() {
        let s = structure();
        let base = s.list().with_title("Content");
        let a = base.with_items([s.document_type_list_item("book")]);
        let b = base.with_id("other").with_items([s.document_type_list_item("author")]);

        assert!(base.items().is_empty());
        let a = a.serialize(&SerializeOptions::default()).unwrap();
        let b = b.serialize(&SerializeOptions::default()).unwrap();
        assert_eq!(a.id(), "content");
        assert_eq!(b.id(), "other");
        assert_eq!(a.as_list().unwrap().items[0].id(), "book");
        assert_eq!(b.as_list().unwrap().items[0].id(), "author");
    }

    #[test]
    fn serialized_nodes_use_camel_case_json() {
        let s = structure();
        let node = s.document_type_list("book").serialize(&SerializeOptions::default()).unwrap();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "documentList");
        assert_eq!(json["schemaTypeName"], "book");
        assert_eq!(json["options"]["apiVersion"], DEFAULT_API_VERSION);
        assert_eq!(json["menuItemGroups"][0]["id"], "sorting");
    }

    #[test]
    fn unvisited_branches_are_never_validated() {
        let s = structure();
        let broken = s.list();
        let root = s
            .list()
            .with_id("root")
            .with_items([s.list_item().with_id("lazy").with_title("Lazy").with_child(broken)]);
        assert!(root.serialize(&SerializeOptions::default()).is_ok());
    }
}
