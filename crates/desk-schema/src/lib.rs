//! Desk Schema
//!
//! The read-only schema capability consumed by the structure engine.
//!
//! # Core Concepts
//!
//! - [`Schema`]: compiled, immutable set of named [`SchemaType`]s
//! - [`TypeDef`]: plain serde definition a schema is compiled from
//! - [`FieldPath`]: dotted field path with array accessors (`tags[0]`, `items[_key=="a"]`)
//! - [`resolve_field_type`] / [`field_extends_type`]: static type lookup along a path
//! - [`extended_projection`]: query projection that dereferences references along ordering paths
//! - [`SortOrdering`]: named default sort configurations
//!
//! # Example
//!
//! ```rust,ignore
//! use desk_schema::{Schema, TypeDef, extended_projection, SortOrderingItem};
//!
//! let schema = Schema::compile([
//!     TypeDef::named("author", "document").with_field(TypeDef::named("name", "string")),
//!     TypeDef::named("book", "document")
//!         .with_field(TypeDef::named("author", "reference").with_to("author")),
//! ])?;
//!
//! let book = schema.get("book").unwrap();
//! let projection = extended_projection(&schema, &book, &[SortOrderingItem::asc("author.name")]);
//! assert_eq!(projection, "author->{name}");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod i18n;
mod ordering;
mod path;
mod projection;
mod types;

pub use error::{PathError, ProjectionError, SchemaError};
pub use i18n::I18nTitle;
pub use ordering::{
    apply_ordering_functions, default_ordering_options, default_selected_ordering, MapWith,
    SortDirection, SortOrdering, SortOrderingItem,
};
pub use path::{FieldPath, PathSegment};
pub use projection::{
    extended_projection, extended_projection_strict, field_extends_type, resolve_field_type,
    type_extends, IMPLICIT_FIELDS,
};
pub use types::{Field, JsonType, ReferenceTarget, Schema, SchemaType, TypeDef, TypeKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn compile_project_and_map_orderings() {
        let schema = Schema::compile([
            TypeDef::named("author", "document")
                .with_field(TypeDef::named("name", "string"))
                .with_field(TypeDef::named("born", "datetime")),
            TypeDef::named("book", "document")
                .with_field(TypeDef::named("title", "string"))
                .with_field(TypeDef::named("author", "reference").with_to("author")),
        ])
        .unwrap();

        let book = schema.get("book").unwrap();
        let by = [SortOrderingItem::asc("author.name"), SortOrderingItem::desc("_updatedAt")];
        assert_eq!(extended_projection(&schema, &book, &by), "author->{name}");

        let author = schema.get("author").unwrap();
        let ordering = SortOrdering::new("bornDesc", "Born").with_by(SortOrderingItem::desc("born"));
        let mapped = apply_ordering_functions(&schema, &ordering, &author);
        assert_eq!(mapped.by[0].map_with, Some(MapWith::DateTime));
    }
}
