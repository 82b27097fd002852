//! Compiled schema types
//!
//! Definitions arrive as plain serde data ([`TypeDef`]) and are compiled once
//! into an immutable graph of [`SchemaType`]s. Every compiled type keeps a
//! link to the type it was derived from, so alias chains like
//! `publishedAt -> datetime` can be walked later.
//!
//! References name their targets instead of pointing at them. Document types
//! commonly reference each other, and names keep the graph acyclic.

use crate::error::SchemaError;
use crate::ordering::SortOrdering;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// JSON representation of values of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonType {
    /// Lowercase name as used in schema definitions
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl Display for JsonType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a compiled type
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Strings, numbers, booleans and their aliases
    Scalar,
    /// Object-like types, documents included
    Object { fields: Vec<Field> },
    /// Arrays with their possible member types
    Array { of: Vec<Arc<SchemaType>> },
    /// References with the names of their possible target types
    Reference { to: Vec<String> },
}

/// Named field of an object-like type
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    field_type: Arc<SchemaType>,
}

impl Field {
    /// Create new field
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: Arc<SchemaType>) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Get field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get field type
    #[inline]
    #[must_use]
    pub fn field_type(&self) -> &Arc<SchemaType> {
        &self.field_type
    }
}

/// Compiled schema type
#[derive(Debug, Clone)]
pub struct SchemaType {
    name: String,
    title: Option<String>,
    json_type: JsonType,
    parent: Option<Arc<SchemaType>>,
    kind: TypeKind,
    orderings: Vec<SortOrdering>,
}

impl SchemaType {
    fn root(name: &str, json_type: JsonType, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            json_type,
            parent: None,
            kind,
            orderings: Vec::new(),
        }
    }

    /// Get type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get display title, if one was defined
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Get JSON representation
    #[inline]
    #[must_use]
    pub fn json_type(&self) -> JsonType {
        self.json_type
    }

    /// Get the type this one was derived from (`None` for built-ins)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<SchemaType>> {
        self.parent.as_ref()
    }

    /// Get type shape
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Fields of object-like types
    #[inline]
    #[must_use]
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.kind {
            TypeKind::Object { fields } => Some(fields),
            _ => None,
        }
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|field| field.name == name)
    }

    /// Member types of array types
    #[inline]
    #[must_use]
    pub fn of(&self) -> Option<&[Arc<SchemaType>]> {
        match &self.kind {
            TypeKind::Array { of } => Some(of),
            _ => None,
        }
    }

    /// Target type names of reference types
    #[inline]
    #[must_use]
    pub fn reference_targets(&self) -> Option<&[String]> {
        match &self.kind {
            TypeKind::Reference { to } => Some(to),
            _ => None,
        }
    }

    /// Named default sort configurations
    #[inline]
    #[must_use]
    pub fn orderings(&self) -> &[SortOrdering] {
        &self.orderings
    }

    /// Check if this type derives from the built-in `document` type
    #[must_use]
    pub fn is_document_type(&self) -> bool {
        let mut current = self.parent.as_deref();
        while let Some(ty) = current {
            if ty.name == "document" && ty.parent.is_none() {
                return true;
            }
            current = ty.parent.as_deref();
        }
        false
    }
}

/// Reference target in a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    /// Target type name
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Serializable type definition
///
/// Top-level definitions and fields need a `name`. Array members may omit it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub of: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<ReferenceTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orderings: Vec<SortOrdering>,
}

impl TypeDef {
    /// Named definition deriving from `type_name`
    #[must_use]
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Anonymous definition, used for array members
    #[must_use]
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// With title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With an additional field
    #[must_use]
    pub fn with_field(mut self, field: TypeDef) -> Self {
        self.fields.push(field);
        self
    }

    /// With an additional array member type
    #[must_use]
    pub fn with_member(mut self, member: TypeDef) -> Self {
        self.of.push(member);
        self
    }

    /// With an additional reference target
    #[must_use]
    pub fn with_to(mut self, type_name: impl Into<String>) -> Self {
        self.to.push(ReferenceTarget {
            type_name: type_name.into(),
        });
        self
    }

    /// With an additional ordering
    #[must_use]
    pub fn with_ordering(mut self, ordering: SortOrdering) -> Self {
        self.orderings.push(ordering);
        self
    }
}

/// Compiled schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: IndexMap<String, Arc<SchemaType>>,
    user_types: Vec<String>,
}

impl Schema {
    /// Compile definitions into a schema
    ///
    /// # Errors
    /// Fails on unknown or duplicate type names, cyclic definitions, unnamed
    /// fields and references to undefined types.
    pub fn compile(defs: impl IntoIterator<Item = TypeDef>) -> Result<Self, SchemaError> {
        let defs: Vec<TypeDef> = defs.into_iter().collect();
        let builtins = builtin_types();

        let mut by_name: IndexMap<&str, &TypeDef> = IndexMap::new();
        for def in &defs {
            let name = def
                .name
                .as_deref()
                .ok_or_else(|| SchemaError::invalid(&def.type_name, "top-level types need a name"))?;
            if builtins.contains_key(name) || by_name.insert(name, def).is_some() {
                return Err(SchemaError::DuplicateType(name.to_string()));
            }
        }

        let mut compiler = Compiler {
            defs: by_name,
            compiled: builtins,
            visiting: HashSet::new(),
        };
        let names: Vec<&str> = compiler.defs.keys().copied().collect();
        for name in &names {
            compiler.named(name)?;
        }

        for name in &names {
            if let Some(ty) = compiler.compiled.get(*name) {
                validate_references(name, ty, &compiler.compiled)?;
            }
        }

        Ok(Self {
            types: compiler.compiled,
            user_types: names.iter().map(|name| (*name).to_string()).collect(),
        })
    }

    /// Look up a type by name (built-ins included)
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<SchemaType>> {
        self.types.get(name).cloned()
    }

    /// Check if a type exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Names of user-defined types in definition order
    #[inline]
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.user_types.iter().map(String::as_str)
    }

    /// User-defined document types in definition order
    pub fn document_types(&self) -> impl Iterator<Item = &Arc<SchemaType>> {
        self.user_types
            .iter()
            .filter_map(|name| self.types.get(name))
            .filter(|ty| ty.is_document_type())
    }
}

struct Compiler<'a> {
    defs: IndexMap<&'a str, &'a TypeDef>,
    compiled: IndexMap<String, Arc<SchemaType>>,
    visiting: HashSet<String>,
}

impl<'a> Compiler<'a> {
    fn named(&mut self, name: &str) -> Result<Arc<SchemaType>, SchemaError> {
        if let Some(ty) = self.compiled.get(name) {
            return Ok(Arc::clone(ty));
        }
        let Some(def) = self.defs.get(name).copied() else {
            return Err(SchemaError::UnknownType(name.to_string()));
        };
        if !self.visiting.insert(name.to_string()) {
            return Err(SchemaError::CyclicType(name.to_string()));
        }

        let ty = self.derive(def, Some(name))?;
        self.visiting.remove(name);
        self.compiled.insert(name.to_string(), Arc::clone(&ty));
        Ok(ty)
    }

    fn derive(&mut self, def: &'a TypeDef, name: Option<&str>) -> Result<Arc<SchemaType>, SchemaError> {
        let parent = self.named(&def.type_name)?;
        let owner = name.unwrap_or(&def.type_name).to_string();

        let kind = match parent.kind() {
            TypeKind::Object { fields } if def.fields.is_empty() => TypeKind::Object {
                fields: fields.clone(),
            },
            TypeKind::Object { .. } => {
                let mut fields = Vec::with_capacity(def.fields.len());
                for field in &def.fields {
                    let field_name = field
                        .name
                        .as_deref()
                        .ok_or_else(|| SchemaError::invalid(&owner, "fields need a name"))?;
                    if fields.iter().any(|existing: &Field| existing.name() == field_name) {
                        return Err(SchemaError::invalid(
                            &owner,
                            format!("field '{field_name}' is declared twice"),
                        ));
                    }
                    fields.push(Field::new(field_name, self.derive(field, None)?));
                }
                TypeKind::Object { fields }
            }
            TypeKind::Array { of } if def.of.is_empty() => TypeKind::Array { of: of.clone() },
            TypeKind::Array { .. } => TypeKind::Array {
                of: def
                    .of
                    .iter()
                    .map(|member| self.derive(member, None))
                    .collect::<Result<_, _>>()?,
            },
            TypeKind::Reference { to } if def.to.is_empty() => TypeKind::Reference { to: to.clone() },
            TypeKind::Reference { .. } => TypeKind::Reference {
                to: def.to.iter().map(|target| target.type_name.clone()).collect(),
            },
            TypeKind::Scalar => {
                if !def.fields.is_empty() || !def.of.is_empty() || !def.to.is_empty() {
                    return Err(SchemaError::invalid(
                        &owner,
                        format!("'{}' cannot declare fields, members or targets", parent.name()),
                    ));
                }
                TypeKind::Scalar
            }
        };

        Ok(Arc::new(SchemaType {
            name: name.map_or_else(|| parent.name().to_string(), str::to_string),
            title: def.title.clone(),
            json_type: parent.json_type(),
            parent: Some(Arc::clone(&parent)),
            kind,
            orderings: def.orderings.clone(),
        }))
    }
}

fn validate_references(
    owner: &str,
    ty: &SchemaType,
    types: &IndexMap<String, Arc<SchemaType>>,
) -> Result<(), SchemaError> {
    match ty.kind() {
        TypeKind::Reference { to } => {
            if let Some(target) = to.iter().find(|target| !types.contains_key(target.as_str())) {
                return Err(SchemaError::UnknownReferenceTarget {
                    owner: owner.to_string(),
                    target: target.clone(),
                });
            }
        }
        TypeKind::Object { fields } => {
            for field in fields {
                validate_references(owner, field.field_type(), types)?;
            }
        }
        TypeKind::Array { of } => {
            for member in of {
                validate_references(owner, member, types)?;
            }
        }
        TypeKind::Scalar => {}
    }
    Ok(())
}

fn builtin_types() -> IndexMap<String, Arc<SchemaType>> {
    let string = Arc::new(SchemaType::root("string", JsonType::String, TypeKind::Scalar));
    let mut types = vec![
        Arc::clone(&string),
        Arc::new(SchemaType::root("text", JsonType::String, TypeKind::Scalar)),
        Arc::new(SchemaType::root("url", JsonType::String, TypeKind::Scalar)),
        Arc::new(SchemaType::root("email", JsonType::String, TypeKind::Scalar)),
        Arc::new(SchemaType::root("date", JsonType::String, TypeKind::Scalar)),
        Arc::new(SchemaType::root("datetime", JsonType::String, TypeKind::Scalar)),
        Arc::new(SchemaType::root("number", JsonType::Number, TypeKind::Scalar)),
        Arc::new(SchemaType::root("boolean", JsonType::Boolean, TypeKind::Scalar)),
        Arc::new(SchemaType::root("object", JsonType::Object, TypeKind::Object { fields: Vec::new() })),
        Arc::new(SchemaType::root("document", JsonType::Object, TypeKind::Object { fields: Vec::new() })),
        Arc::new(SchemaType::root("array", JsonType::Array, TypeKind::Array { of: Vec::new() })),
        Arc::new(SchemaType::root("reference", JsonType::Object, TypeKind::Reference { to: Vec::new() })),
    ];
    types.push(Arc::new(SchemaType::root(
        "slug",
        JsonType::Object,
        TypeKind::Object {
            fields: vec![Field::new("current", string)],
        },
    )));

    types
        .into_iter()
        .map(|ty| (ty.name().to_string(), ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Schema {
        Schema::compile([
            TypeDef::named("author", "document")
                .with_title("Author")
                .with_field(TypeDef::named("name", "string")),
            TypeDef::named("book", "document")
                .with_field(TypeDef::named("title", "string"))
                .with_field(TypeDef::named("author", "reference").with_to("author"))
                .with_field(
                    TypeDef::named("chapters", "array").with_member(TypeDef::of_type("chapter")),
                ),
            TypeDef::named("chapter", "object").with_field(TypeDef::named("heading", "string")),
        ])
        .unwrap()
    }

    #[test]
    fn compiles_fields_in_declaration_order() {
        let schema = library();
        let book = schema.get("book").unwrap();
        let names: Vec<_> = book.fields().unwrap().iter().map(Field::name).collect();
        assert_eq!(names, vec!["title", "author", "chapters"]);
    }

    #[test]
    fn field_types_keep_their_alias_chain() {
        let schema = library();
        let book = schema.get("book").unwrap();
        let title = book.field("title").unwrap();
        assert_eq!(title.field_type().name(), "string");
        assert_eq!(title.field_type().parent().unwrap().name(), "string");
        assert_eq!(title.field_type().json_type(), JsonType::String);
    }

    #[test]
    fn document_types_exclude_plain_objects() {
        let schema = library();
        let names: Vec<_> = schema.document_types().map(|ty| ty.name().to_string()).collect();
        assert_eq!(names, vec!["author", "book"]);
    }

    #[test]
    fn forward_references_between_named_types_compile() {
        let schema = library();
        let chapters = schema.get("book").unwrap().field("chapters").unwrap().field_type().clone();
        let member = &chapters.of().unwrap()[0];
        assert_eq!(member.name(), "chapter");
        assert!(member.field("heading").is_some());
    }

    #[test]
    fn rejects_unknown_types() {
        let err = Schema::compile([TypeDef::named("book", "novel")]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownType("novel".to_string()));
    }

    #[test]
    fn rejects_duplicates_and_builtin_shadowing() {
        let err = Schema::compile([
            TypeDef::named("book", "document"),
            TypeDef::named("book", "document"),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("book".to_string()));

        let err = Schema::compile([TypeDef::named("string", "text")]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("string".to_string()));
    }

    #[test]
    fn rejects_cycles() {
        let err = Schema::compile([TypeDef::named("a", "b"), TypeDef::named("b", "a")]).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicType(_)));
    }

    #[test]
    fn rejects_references_to_missing_types() {
        let err = Schema::compile([TypeDef::named("book", "document")
            .with_field(TypeDef::named("author", "reference").with_to("author"))])
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownReferenceTarget { ref target, .. } if target == "author"));
    }

    #[test]
    fn rejects_fields_on_scalars() {
        let err = Schema::compile([
            TypeDef::named("label", "string").with_field(TypeDef::named("x", "string")),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefinition { .. }));
    }

    #[test]
    fn deserializes_definitions() {
        let def: TypeDef = serde_json::from_str(
            r#"{"name":"book","type":"document","fields":[{"name":"author","type":"reference","to":[{"type":"author"}]}]}"#,
        )
        .unwrap();
        assert_eq!(def.fields[0].to[0].type_name, "author");
    }
}
