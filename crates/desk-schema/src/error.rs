//! Error types for the schema crate

/// Errors while compiling schema definitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A definition refers to a type that does not exist
    #[error("unknown schema type: '{0}'")]
    UnknownType(String),

    /// Two definitions share a name (or shadow a built-in type)
    #[error("schema type '{0}' is defined more than once")]
    DuplicateType(String),

    /// A type is (transitively) defined in terms of itself
    #[error("schema type '{0}' is defined in terms of itself")]
    CyclicType(String),

    /// Structural problem with a definition
    #[error("invalid definition for '{owner}': {reason}")]
    InvalidDefinition { owner: String, reason: String },

    /// A reference points at a type the schema does not define
    #[error("reference in '{owner}' targets unknown type '{target}'")]
    UnknownReferenceTarget { owner: String, target: String },
}

impl SchemaError {
    /// Create invalid definition error
    pub fn invalid(owner: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            owner: owner.into(),
            reason: reason.into(),
        }
    }
}

/// Errors while parsing a field path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path string is empty
    #[error("field path is empty")]
    Empty,

    /// Two separators without a field name between them
    #[error("field path '{0}' has an empty segment")]
    EmptySegment(String),

    /// `[` without matching `]`
    #[error("unterminated accessor in field path '{0}'")]
    Unterminated(String),

    /// Accessor that is neither an index nor a `_key` lookup
    #[error("invalid accessor '{accessor}' in field path '{path}'")]
    InvalidAccessor { path: String, accessor: String },
}

/// Errors while building an extended projection in strict mode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// Ordering targets a field the type does not declare
    #[error(
        "The current ordering config targeted the nonexistent field \"{field}\" on schema type \"{type_name}\". It should be one of {}",
        .available.join(", ")
    )]
    UnknownField {
        field: String,
        type_name: String,
        available: Vec<String>,
    },
}
