//! Immutable structure builders
//!
//! Every setter borrows the builder and returns a new one, so a builder can
//! serve as a template for any number of variants. Collections are
//! persistent vectors, which keeps those copies cheap.
//!
//! Nothing is validated until [`SerializePane::serialize`] runs, and that
//! only happens for panes the resolver actually visits.

mod component;
mod document;
mod document_list;
mod initial_value_template;
mod list;
mod list_item;
mod menu_item;
mod menu_item_group;
mod view;

pub use component::ComponentBuilder;
pub use document::DocumentBuilder;
pub use document_list::{document_child_resolver, DocumentListBuilder, DEFAULT_API_VERSION, LEGACY_API_VERSION};
pub use initial_value_template::InitialValueTemplateItemBuilder;
pub use list::{resolve_child_for_item, ListBuilder, ListEntryBuilder};
pub use list_item::ListItemBuilder;
pub use menu_item::MenuItemBuilder;
pub use menu_item_group::MenuItemGroupBuilder;
pub use view::{ViewBuilder, ViewFactory};

use crate::context::{DocumentNodeOptions, StructureContext};
use crate::error::{HelpId, PathSegment, SerializeError};
use crate::id::{start_case, structure_node_id, validate_id};
use crate::intent::{IntentChecker, DEFAULT_TYPE_FILTER};
use crate::node::{Divider, InitialValueTemplateItem, Layout, MenuItemGroup, PaneCommon};
use crate::unresolved::UnresolvedPaneNode;
use desk_schema::{
    default_ordering_options, default_selected_ordering, extended_projection, I18nTitle, SchemaType, SortOrdering,
};
use im::Vector;
use std::sync::Arc;

/// Where in the tree a builder is serialized
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Ancestor ids
    pub path: Vec<String>,
    /// Position among siblings
    pub index: Option<usize>,
    /// Extra label for error paths
    pub hint: Option<String>,
}

impl SerializeOptions {
    /// Options at `path`
    #[must_use]
    pub fn at(path: Vec<String>) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// With sibling position
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// With hint
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub(crate) fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub(crate) fn child_path(&self, id: &str) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(id.to_string());
        path
    }
}

/// Anything that can be turned into a pane node
pub trait SerializePane: Send + Sync {
    /// Validate and produce the pane node
    ///
    /// # Errors
    /// Returns a [`SerializeError`] naming the offending tree position.
    fn serialize(&self, options: &SerializeOptions) -> Result<crate::node::PaneNode, SerializeError>;
}

macro_rules! impl_into_unresolved {
    ($($builder:ty),* $(,)?) => {
        $(
            impl From<$builder> for UnresolvedPaneNode {
                fn from(builder: $builder) -> Self {
                    Self::builder(builder)
                }
            }
        )*
    };
}

impl_into_unresolved!(ListBuilder, DocumentListBuilder, DocumentBuilder, ComponentBuilder);

/// State shared by list and document list builders
#[derive(Clone, Default)]
pub(crate) struct GenericListSpec {
    pub(crate) id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) i18n: Option<I18nTitle>,
    pub(crate) menu_items: Vector<MenuItemBuilder>,
    pub(crate) menu_item_groups: Vector<MenuItemGroupBuilder>,
    pub(crate) initial_value_templates: Option<Vector<InitialValueTemplateItemBuilder>>,
    pub(crate) default_layout: Option<Layout>,
    pub(crate) child: Option<UnresolvedPaneNode>,
    pub(crate) can_handle_intent: Option<IntentChecker>,
}

impl GenericListSpec {
    pub(crate) fn effective_id(&self) -> Option<String> {
        structure_node_id(self.id.as_deref(), self.title.as_deref())
    }

    pub(crate) fn serialize_common(
        &self,
        id: &str,
        options: &SerializeOptions,
    ) -> Result<PaneCommon, SerializeError> {
        validate_id(id, &options.path, PathSegment::Id(id.to_string()))?;
        let path = options.child_path(id);
        Ok(PaneCommon {
            id: id.to_string(),
            title: self.title.clone(),
            i18n: self.i18n.clone(),
            menu_items: serialize_menu_items(&self.menu_items, &path)?,
            menu_item_groups: serialize_menu_item_groups(&self.menu_item_groups, &path)?,
        })
    }

    pub(crate) fn serialize_templates(
        &self,
        context: &StructureContext,
        path: &[String],
    ) -> Result<Vec<InitialValueTemplateItem>, SerializeError> {
        self.initial_value_templates
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, item)| item.serialize(context, path, index))
            .collect()
    }
}

/// Generates the setters list-like builders share
macro_rules! generic_list_setters {
    ($builder:ty) => {
        impl $builder {
            /// Get explicit id
            #[inline]
            #[must_use]
            pub fn id(&self) -> Option<&str> {
                self.spec.id.as_deref()
            }

            /// Get title
            #[inline]
            #[must_use]
            pub fn title(&self) -> Option<&str> {
                self.spec.title.as_deref()
            }

            /// With id
            #[must_use]
            pub fn with_id(&self, id: impl Into<String>) -> Self {
                let mut next = self.clone();
                next.spec.id = Some(id.into());
                next
            }

            /// With title
            #[must_use]
            pub fn with_title(&self, title: impl Into<String>) -> Self {
                let mut next = self.clone();
                next.spec.title = Some(title.into());
                next
            }

            /// With localized title
            #[must_use]
            pub fn with_i18n(&self, i18n: desk_schema::I18nTitle) -> Self {
                let mut next = self.clone();
                next.spec.i18n = Some(i18n);
                next
            }

            /// With menu items
            #[must_use]
            pub fn with_menu_items(&self, items: impl IntoIterator<Item = $crate::builder::MenuItemBuilder>) -> Self {
                let mut next = self.clone();
                next.spec.menu_items = items.into_iter().collect();
                next
            }

            /// With menu item groups
            #[must_use]
            pub fn with_menu_item_groups(
                &self,
                groups: impl IntoIterator<Item = $crate::builder::MenuItemGroupBuilder>,
            ) -> Self {
                let mut next = self.clone();
                next.spec.menu_item_groups = groups.into_iter().collect();
                next
            }

            /// With initial value templates
            #[must_use]
            pub fn with_initial_value_templates(
                &self,
                templates: impl IntoIterator<Item = $crate::builder::InitialValueTemplateItemBuilder>,
            ) -> Self {
                let mut next = self.clone();
                next.spec.initial_value_templates = Some(templates.into_iter().collect());
                next
            }

            /// With default layout
            #[must_use]
            pub fn with_default_layout(&self, layout: $crate::node::Layout) -> Self {
                let mut next = self.clone();
                next.spec.default_layout = Some(layout);
                next
            }

            /// With child resolver
            #[must_use]
            pub fn with_child(&self, child: impl Into<$crate::unresolved::UnresolvedPaneNode>) -> Self {
                let mut next = self.clone();
                next.spec.child = Some(child.into());
                next
            }

            /// With intent check
            #[must_use]
            pub fn with_can_handle_intent(&self, checker: $crate::intent::IntentChecker) -> Self {
                let mut next = self.clone();
                next.spec.can_handle_intent = Some(checker);
                next
            }
        }
    };
}

pub(crate) use generic_list_setters;

pub(crate) fn serialize_menu_items(
    items: &Vector<MenuItemBuilder>,
    path: &[String],
) -> Result<Vec<crate::node::MenuItem>, SerializeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| item.serialize(path, index))
        .collect()
}

pub(crate) fn serialize_menu_item_groups(
    groups: &Vector<MenuItemGroupBuilder>,
    path: &[String],
) -> Result<Vec<MenuItemGroup>, SerializeError> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| group.serialize(path, index))
        .collect()
}

pub(crate) fn id_required(what: &str, options: &SerializeOptions) -> SerializeError {
    SerializeError::new(
        format!("`id` is required for {what}"),
        &options.path,
        PathSegment::of(None, options.index),
        options.hint(),
    )
    .with_help_id(HelpId::IdRequired)
}

pub(crate) fn schema_type_not_found(name: &str, path: &[String], segment: PathSegment) -> SerializeError {
    SerializeError::new(format!("Could not find type \"{name}\" in schema"), path, segment, None)
        .with_help_id(HelpId::SchemaTypeNotFound)
}

/// Entry point for creating builders
///
/// Every builder created here shares the structure context.
#[derive(Debug, Clone)]
pub struct StructureBuilder {
    context: Arc<StructureContext>,
}

impl StructureBuilder {
    /// Create factory over `context`
    #[must_use]
    pub fn new(context: Arc<StructureContext>) -> Self {
        Self { context }
    }

    /// Get structure context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Arc<StructureContext> {
        &self.context
    }

    #[must_use]
    pub fn list(&self) -> ListBuilder {
        ListBuilder::new(Arc::clone(&self.context))
    }

    #[must_use]
    pub fn list_item(&self) -> ListItemBuilder {
        ListItemBuilder::new(Arc::clone(&self.context))
    }

    /// List item for one document; title optional, schema type required
    #[must_use]
    pub fn document_list_item(&self) -> ListItemBuilder {
        ListItemBuilder::document(Arc::clone(&self.context))
    }

    #[must_use]
    pub fn document_list(&self) -> DocumentListBuilder {
        DocumentListBuilder::new(Arc::clone(&self.context))
    }

    #[must_use]
    pub fn document(&self) -> DocumentBuilder {
        DocumentBuilder::new(Arc::clone(&self.context))
    }

    #[must_use]
    pub fn component(&self) -> ComponentBuilder {
        ComponentBuilder::new()
    }

    #[must_use]
    pub fn menu_item(&self) -> MenuItemBuilder {
        MenuItemBuilder::new()
    }

    #[must_use]
    pub fn menu_item_group(&self) -> MenuItemGroupBuilder {
        MenuItemGroupBuilder::new()
    }

    #[must_use]
    pub fn initial_value_template_item(&self, template_id: impl Into<String>) -> InitialValueTemplateItemBuilder {
        InitialValueTemplateItemBuilder::new(template_id)
    }

    #[must_use]
    pub fn view(&self) -> ViewFactory {
        ViewFactory
    }

    /// Divider with a generated unique id
    #[must_use]
    pub fn divider(&self) -> ListEntryBuilder {
        ListEntryBuilder::Divider(Divider {
            id: format!("__divider__{}", ulid::Ulid::new()),
        })
    }

    /// Document node for a document, as the resolver would create it
    #[must_use]
    pub fn default_document(&self, options: &DocumentNodeOptions) -> DocumentBuilder {
        self.context.resolve_document_node(options)
    }

    /// List of every document of one type, with sort and layout menus
    ///
    /// An unknown type is reported when the list is serialized.
    #[must_use]
    pub fn document_type_list(&self, type_name: &str) -> DocumentListBuilder {
        let schema_type = self.context.schema().get(type_name);
        let title = schema_type
            .as_ref()
            .and_then(|ty| ty.title().map(str::to_string))
            .unwrap_or_else(|| start_case(type_name));

        let mut menu_items = schema_type
            .as_ref()
            .map(|ty| self.ordering_menu_items_for_type(ty))
            .unwrap_or_default();
        menu_items.push(
            self.menu_item()
                .with_group("layout")
                .with_title("Compact view")
                .with_action("setLayout")
                .with_params(serde_json::json!({ "layout": "default" })),
        );
        menu_items.push(
            self.menu_item()
                .with_group("layout")
                .with_title("Detailed view")
                .with_action("setLayout")
                .with_params(serde_json::json!({ "layout": "detail" })),
        );

        self.document_list()
            .with_id(type_name)
            .with_title(title)
            .with_filter(DEFAULT_TYPE_FILTER)
            .with_param("type", type_name)
            .with_schema_type(type_name)
            .with_default_ordering(default_selected_ordering().by)
            .with_menu_item_groups([
                self.menu_item_group().with_id("sorting").with_title("Sort"),
                self.menu_item_group().with_id("layout").with_title("Layout"),
                self.menu_item_group().with_id("actions").with_title("Actions"),
            ])
            .with_menu_items(menu_items)
    }

    /// List item opening [`StructureBuilder::document_type_list`]
    #[must_use]
    pub fn document_type_list_item(&self, type_name: &str) -> ListItemBuilder {
        let title = self
            .context
            .schema()
            .get(type_name)
            .and_then(|ty| ty.title().map(str::to_string))
            .unwrap_or_else(|| start_case(type_name));

        let type_name = type_name.to_string();
        let child_type = type_name.clone();
        self.list_item()
            .with_id(type_name.clone())
            .with_title(title)
            .with_schema_type(type_name)
            .with_child(UnresolvedPaneNode::resolver(move |id, ctx| {
                let structure = StructureBuilder::new(Arc::clone(&ctx.structure_context));
                let mut list = structure.document_type_list(&child_type);
                let item_title = ctx
                    .parent
                    .as_deref()
                    .and_then(crate::node::PaneNode::as_list)
                    .and_then(|parent| parent.list_items().find(|item| item.id == id))
                    .and_then(|item| item.title.clone());
                if let Some(title) = item_title {
                    list = list.with_title(title);
                }
                crate::unresolved::ResolverOutput::ready(list)
            }))
    }

    /// One [`StructureBuilder::document_type_list_item`] per document type
    #[must_use]
    pub fn document_type_list_items(&self) -> Vec<ListItemBuilder> {
        self.context
            .schema()
            .document_types()
            .map(|ty| self.document_type_list_item(ty.name()))
            .collect()
    }

    /// Root list used when no structure is configured
    #[must_use]
    pub fn defaults(&self) -> ListBuilder {
        self.list()
            .with_id("content")
            .with_title("Content")
            .with_items(self.document_type_list_items())
    }

    /// Menu item switching the sort order to `ordering`
    ///
    /// `params.by` holds the clauses as declared. Mappers are applied when
    /// the list query is built.
    #[must_use]
    pub fn ordering_menu_item(&self, schema_type: &SchemaType, ordering: &SortOrdering) -> MenuItemBuilder {
        let projection = extended_projection(self.context.schema(), schema_type, &ordering.by);
        let mut item = self
            .menu_item()
            .with_group("sorting")
            .with_title(format!("Sort by {}", ordering.title))
            .with_action("setSortOrder")
            .with_params(serde_json::json!({
                "by": ordering.by,
                "extendedProjection": projection,
            }));
        if let Some(i18n) = &ordering.i18n {
            item = item.with_i18n(i18n.clone());
        }
        item
    }

    /// Sort menu items for a type's own orderings followed by the defaults
    #[must_use]
    pub fn ordering_menu_items_for_type(&self, schema_type: &SchemaType) -> Vec<MenuItemBuilder> {
        schema_type
            .orderings()
            .iter()
            .cloned()
            .chain(default_ordering_options())
            .map(|ordering| self.ordering_menu_item(schema_type, &ordering))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PaneNode;
    use desk_schema::{Schema, SortOrderingItem, TypeDef};
    use pretty_assertions::assert_eq;

    fn structure() -> StructureBuilder {
        let schema = Schema::compile([
            TypeDef::named("author", "document").with_field(TypeDef::named("name", "string")),
            TypeDef::named("blogPost", "document")
                .with_field(TypeDef::named("title", "string"))
                .with_field(TypeDef::named("author", "reference").with_to("author"))
                .with_ordering(
                    SortOrdering::new("authorAsc", "Author").with_by(SortOrderingItem::asc("author.name")),
                ),
        ])
        .unwrap();
        StructureBuilder::new(Arc::new(StructureContext::new(Arc::new(schema))))
    }

    #[test]
    fn document_type_list_is_fully_configured() {
        let s = structure();
        let node = s.document_type_list("blogPost").serialize(&SerializeOptions::default()).unwrap();
        let PaneNode::DocumentList(list) = node else {
            panic!("expected a document list");
        };
        assert_eq!(list.common.id, "blogPost");
        assert_eq!(list.common.title.as_deref(), Some("Blog Post"));
        assert_eq!(list.options.filter, DEFAULT_TYPE_FILTER);
        assert_eq!(list.options.params["type"], "blogPost");
        assert_eq!(list.schema_type_name.as_deref(), Some("blogPost"));
        assert_eq!(list.options.default_ordering, vec![SortOrderingItem::desc("_updatedAt")]);

        let groups: Vec<_> = list.common.menu_item_groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(groups, vec!["sorting", "layout", "actions"]);

        let titles: Vec<_> = list.common.menu_items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Sort by Author", "Sort by Last edited", "Sort by Created", "Compact view", "Detailed view"]
        );
        assert_eq!(list.initial_value_templates[0].template_id, "blogPost");
    }

    #[test]
    fn ordering_menu_items_carry_projection_and_declared_clauses() {
        let s = structure();
        let post = s.context().schema().get("blogPost").unwrap();
        let items = s.ordering_menu_items_for_type(&post);
        let item = items[0].serialize(&[], 0).unwrap();
        let params = item.params.unwrap();
        assert_eq!(params["extendedProjection"], "author->{name}");
        assert!(params["by"][0].get("mapWith").is_none());
        assert_eq!(params["by"], serde_json::to_value(&post.orderings()[0].by).unwrap());
        assert_eq!(item.group.as_deref(), Some("sorting"));
        assert_eq!(item.action.as_deref(), Some("setSortOrder"));
    }

    #[test]
    fn unknown_type_list_fails_at_serialize_time() {
        let s = structure();
        let builder = s.document_type_list("nope");
        let err = builder.serialize(&SerializeOptions::default()).unwrap_err();
        assert_eq!(err.message(), "Could not find type \"nope\" in schema");
        assert_eq!(err.help_id(), Some(HelpId::SchemaTypeNotFound));
    }

    #[test]
    fn defaults_list_every_document_type() {
        let s = structure();
        let PaneNode::List(list) = s.defaults().serialize(&SerializeOptions::default()).unwrap() else {
            panic!("expected a list");
        };
        let ids: Vec<_> = list.items.iter().map(|item| item.id().to_string()).collect();
        assert_eq!(ids, vec!["author", "blogPost"]);
    }

    #[test]
    fn dividers_get_unique_ids() {
        let s = structure();
        let (ListEntryBuilder::Divider(a), ListEntryBuilder::Divider(b)) = (s.divider(), s.divider()) else {
            panic!("expected dividers");
        };
        assert!(a.id.starts_with("__divider__"));
        assert_ne!(a.id, b.id);
    }
}
