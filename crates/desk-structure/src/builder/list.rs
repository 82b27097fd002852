use super::{generic_list_setters, id_required, GenericListSpec, ListItemBuilder, SerializeOptions, SerializePane};
use crate::context::StructureContext;
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::intent::IntentChecker;
use crate::node::{Divider, ListEntry, ListNode, PaneNode};
use crate::unresolved::{ResolverOutput, UnresolvedPaneNode};
use im::Vector;
use std::collections::HashSet;
use std::sync::Arc;

const MAX_REPORTED_DUPLICATES: usize = 5;

/// Entry of a list builder
#[derive(Debug, Clone)]
pub enum ListEntryBuilder {
    Item(ListItemBuilder),
    Divider(Divider),
}

impl ListEntryBuilder {
    fn serialize(&self, path: &[String], index: usize) -> Result<ListEntry, SerializeError> {
        match self {
            Self::Item(item) => item.serialize(path, index).map(ListEntry::ListItem),
            Self::Divider(divider) => Ok(ListEntry::Divider(divider.clone())),
        }
    }
}

impl From<ListItemBuilder> for ListEntryBuilder {
    fn from(item: ListItemBuilder) -> Self {
        Self::Item(item)
    }
}

impl From<Divider> for ListEntryBuilder {
    fn from(divider: Divider) -> Self {
        Self::Divider(divider)
    }
}

/// Builder for a pane listing fixed items
#[derive(Clone)]
pub struct ListBuilder {
    context: Arc<StructureContext>,
    spec: GenericListSpec,
    items: Vector<ListEntryBuilder>,
}

generic_list_setters!(ListBuilder);

impl ListBuilder {
    pub(crate) fn new(context: Arc<StructureContext>) -> Self {
        Self {
            context,
            spec: GenericListSpec::default(),
            items: Vector::new(),
        }
    }

    /// Get entries
    #[inline]
    #[must_use]
    pub fn items(&self) -> &Vector<ListEntryBuilder> {
        &self.items
    }

    #[must_use]
    pub fn with_items<I, T>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ListEntryBuilder>,
    {
        let mut next = self.clone();
        next.items = items.into_iter().map(Into::into).collect();
        next
    }
}

impl std::fmt::Debug for ListBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListBuilder")
            .field("id", &self.spec.id)
            .field("title", &self.spec.title)
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl SerializePane for ListBuilder {
    fn serialize(&self, options: &SerializeOptions) -> Result<PaneNode, SerializeError> {
        let Some(id) = self.spec.effective_id() else {
            return Err(id_required("lists", options));
        };
        let common = self.spec.serialize_common(&id, options)?;
        let path = options.child_path(&id);

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.serialize(&path, index))
            .collect::<Result<Vec<_>, _>>()?;
        check_unique_ids(&items, options, &id)?;

        Ok(PaneNode::List(ListNode {
            common,
            items,
            default_layout: self.spec.default_layout,
            initial_value_templates: self.spec.serialize_templates(&self.context, &path)?,
            child: self.spec.child.clone().unwrap_or_else(resolve_child_for_item),
            can_handle_intent: self.spec.can_handle_intent.clone().unwrap_or_else(IntentChecker::shallow),
        }))
    }
}

fn check_unique_ids(items: &[ListEntry], options: &SerializeOptions, list_id: &str) -> Result<(), SerializeError> {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = items
        .iter()
        .filter_map(ListEntry::as_item)
        .map(|item| item.id.as_str())
        .filter(|id| !seen.insert(*id))
        .collect();
    if duplicates.is_empty() {
        return Ok(());
    }

    let mut shown = duplicates
        .iter()
        .take(MAX_REPORTED_DUPLICATES)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if duplicates.len() > MAX_REPORTED_DUPLICATES {
        shown.push_str("...");
    }
    Err(SerializeError::new(
        format!("List items with same ID found ({shown})"),
        &options.path,
        PathSegment::Id(list_id.to_string()),
        options.hint(),
    )
    .with_help_id(HelpId::ListItemIdsMustBeUnique))
}

/// Child resolver handing out the child of the list item with the requested id
#[must_use]
pub fn resolve_child_for_item() -> UnresolvedPaneNode {
    UnresolvedPaneNode::resolver(|id, ctx| {
        let child = ctx
            .parent
            .as_deref()
            .and_then(PaneNode::as_list)
            .and_then(|list| list.list_items().find(|item| item.id == id))
            .and_then(|item| item.child.clone());
        match child {
            Some(UnresolvedPaneNode::Resolver(resolver)) => resolver.call(id, ctx),
            Some(child) => ResolverOutput::ready(child),
            None => ResolverOutput::none(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unresolved::RouterPaneSiblingContext;
    use crate::StructureBuilder;
    use desk_schema::{Schema, TypeDef};
    use pretty_assertions::assert_eq;

    fn structure() -> StructureBuilder {
        let schema = Schema::compile([TypeDef::named("book", "document")]).unwrap();
        StructureBuilder::new(Arc::new(StructureContext::new(Arc::new(schema))))
    }

    #[test]
    fn id_is_required_and_derived_from_title() {
        let s = structure();
        let err = s.list().serialize(&SerializeOptions::default().with_index(2)).unwrap_err();
        assert_eq!(err.message(), "`id` is required for lists");
        assert_eq!(err.path(), ["2"]);

        let node = s.list().with_title("Content").serialize(&SerializeOptions::default()).unwrap();
        assert_eq!(node.id(), "content");
    }

    #[test]
    fn items_are_serialized_below_the_list() {
        let s = structure();
        let err = s
            .list()
            .with_id("root")
            .with_items([s.list_item().with_id("a").with_title("A"), s.list_item()])
            .serialize(&SerializeOptions::default())
            .unwrap_err();
        assert_eq!(err.message(), "`id` is required for list items");
        assert_eq!(err.path(), ["root", "1"]);
    }

    #[test]
    fn duplicate_item_ids_are_rejected() {
        let s = structure();
        let item = |id: &str| ListEntryBuilder::from(s.list_item().with_id(id).with_title(id));
        let err = s
            .list()
            .with_id("root")
            .with_items([item("a"), s.divider(), item("b"), item("a"), item("b")])
            .serialize(&SerializeOptions::default())
            .unwrap_err();
        assert_eq!(err.message(), "List items with same ID found (a, b)");
        assert_eq!(err.help_id(), Some(HelpId::ListItemIdsMustBeUnique));
        assert_eq!(err.path(), ["root"]);
    }

    #[test]
    fn long_duplicate_lists_are_truncated() {
        let s = structure();
        let items: Vec<ListEntryBuilder> = (0..6)
            .flat_map(|n| {
                let item = s.list_item().with_id(format!("i{n}")).with_title("x");
                [ListEntryBuilder::from(item.clone()), ListEntryBuilder::from(item)]
            })
            .collect();
        let err = s
            .list()
            .with_id("root")
            .with_items(items)
            .serialize(&SerializeOptions::default())
            .unwrap_err();
        assert_eq!(err.message(), "List items with same ID found (i0, i1, i2, i3, i4...)");
    }

    #[test]
    fn dividers_do_not_clash() {
        let s = structure();
        let node = s
            .list()
            .with_id("root")
            .with_items([s.divider(), s.divider()])
            .serialize(&SerializeOptions::default())
            .unwrap();
        assert_eq!(node.as_list().unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn default_child_returns_the_item_child() {
        let s = structure();
        let node = Arc::new(
            s.list()
                .with_id("root")
                .with_items([s.list_item().with_id("books").with_title("Books").with_child(s.document_type_list("book"))])
                .serialize(&SerializeOptions::default())
                .unwrap(),
        );
        let ctx = RouterPaneSiblingContext::root(Arc::clone(s.context())).child("books", Arc::clone(&node));
        let UnresolvedPaneNode::Resolver(child) = node.child().unwrap() else {
            panic!("expected the default resolver");
        };
        let resolved = child.call("books", &ctx).first().await.unwrap();
        assert!(matches!(resolved, Some(UnresolvedPaneNode::Builder(_))));
        assert!(child.call("missing", &ctx).first().await.unwrap().is_none());
    }
}
