//! Static field type resolution and extended projections
//!
//! Both walk a field path through a compiled type. Resolution gives up with
//! `None` as soon as the path becomes ambiguous (polymorphic arrays or
//! references), which callers treat as "use the raw field".

use crate::error::ProjectionError;
use crate::ordering::SortOrderingItem;
use crate::path::{FieldPath, PathSegment};
use crate::types::{Field, Schema, SchemaType, TypeKind};
use std::sync::Arc;

/// Fields every document has without declaring them
pub const IMPLICIT_FIELDS: [&str; 5] = ["_id", "_type", "_createdAt", "_updatedAt", "_rev"];

/// Resolve the type of the field at `path`, if it can be determined statically
#[must_use]
pub fn resolve_field_type(schema: &Schema, base: &SchemaType, path: &str) -> Option<Arc<SchemaType>> {
    let path: FieldPath = path.parse().ok()?;
    let mut current: Option<Arc<SchemaType>> = None;

    for segment in path.segments() {
        let ty: &SchemaType = current.as_deref().unwrap_or(base);
        let next = match segment {
            PathSegment::Field(name) => match ty.reference_targets() {
                Some(targets) => {
                    let target = schema.get(single_member(targets)?)?;
                    Arc::clone(target.field(name)?.field_type())
                }
                None => Arc::clone(ty.field(name)?.field_type()),
            },
            PathSegment::Index(_) | PathSegment::Key(_) => {
                let member = single_member(ty.of()?)?;
                match member.reference_targets() {
                    Some(targets) => schema.get(single_member(targets)?)?,
                    None => Arc::clone(member),
                }
            }
        };
        current = Some(next);
    }

    current
}

// References and arrays are only followed when they are unambiguous.
fn single_member<T>(members: &[T]) -> Option<&T> {
    match members {
        [only] => Some(only),
        _ => None,
    }
}

/// Check if a type is, or derives from, the type called `name`
///
/// Once the alias chain ends the JSON type is compared as well, so a
/// `string`-backed type counts as extending `string`.
#[must_use]
pub fn type_extends(ty: &SchemaType, name: &str) -> bool {
    let mut current = Some(ty);
    while let Some(ty) = current {
        if ty.name() == name {
            return true;
        }
        match ty.parent() {
            Some(parent) => current = Some(&**parent),
            None => return ty.json_type().as_str() == name,
        }
    }
    false
}

/// Check if a field's type is, or derives from, the type called `name`
#[inline]
#[must_use]
pub fn field_extends_type(field: &Field, name: &str) -> bool {
    type_extends(field.field_type(), name)
}

/// Build a projection that dereferences every reference hop in the ordering paths
///
/// Fields the type does not declare are logged and dropped; implicit fields
/// are dropped silently.
#[must_use]
pub fn extended_projection(
    schema: &Schema,
    schema_type: &SchemaType,
    by: &[SortOrderingItem],
) -> String {
    build(schema, schema_type, by, false).unwrap_or_default()
}

/// Like [`extended_projection`], but fails on the first unknown field
///
/// # Errors
/// Returns [`ProjectionError::UnknownField`] when an ordering path names a
/// field that is neither declared nor implicit.
pub fn extended_projection_strict(
    schema: &Schema,
    schema_type: &SchemaType,
    by: &[SortOrderingItem],
) -> Result<String, ProjectionError> {
    build(schema, schema_type, by, true)
}

fn build(
    schema: &Schema,
    schema_type: &SchemaType,
    by: &[SortOrderingItem],
    strict: bool,
) -> Result<String, ProjectionError> {
    let mut fragments = Vec::with_capacity(by.len());
    for item in by {
        let segments: Vec<&str> = item
            .field
            .split('.')
            .map(|segment| segment.split('[').next().unwrap_or(segment))
            .collect();
        let fragment = join_references(schema, schema_type, &segments, strict)?;
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }
    Ok(fragments.join(", "))
}

fn join_references(
    schema: &Schema,
    schema_type: &SchemaType,
    path: &[&str],
    strict: bool,
) -> Result<String, ProjectionError> {
    let Some((head, tail)) = path.split_first() else {
        return Ok(String::new());
    };
    let Some(fields) = schema_type.fields() else {
        return Ok(String::new());
    };
    let Some(field) = fields.iter().find(|field| field.name() == *head) else {
        if !IMPLICIT_FIELDS.contains(head) {
            let err = ProjectionError::UnknownField {
                field: (*head).to_string(),
                type_name: schema_type.name().to_string(),
                available: fields.iter().map(|field| field.name().to_string()).collect(),
            };
            if strict {
                return Err(err);
            }
            tracing::warn!("{err}");
        }
        return Ok(String::new());
    };

    if tail.is_empty() {
        return Ok((*head).to_string());
    }

    if let TypeKind::Reference { to } = field.field_type().kind() {
        let mut targets = Vec::with_capacity(to.len());
        for target in to.iter().filter_map(|name| schema.get(name)) {
            let joined = join_references(schema, &target, tail, strict)?;
            if !joined.is_empty() {
                targets.push(joined);
            }
        }
        return Ok(format!("{head}->{{{}}}", targets.join(",")));
    }

    let nested = join_references(schema, field.field_type(), tail, strict)?;
    if nested.is_empty() {
        Ok((*head).to_string())
    } else {
        Ok(format!("{head}{{{nested}}}"))
    }
}
