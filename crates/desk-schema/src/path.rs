//! Field path parsing
//!
//! Paths are dotted field names with optional array accessors:
//! `author.name`, `tags[0]`, `sections[_key=="intro"].title`.

use crate::error::PathError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named field
    Field(String),
    /// Positional array accessor
    Index(usize),
    /// Keyed array accessor (`[_key=="..."]`)
    Key(String),
}

impl PathSegment {
    /// Field name, if this is a field segment
    #[inline]
    #[must_use]
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            _ => None,
        }
    }
}

/// Parsed field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Field names only, array accessors dropped
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(PathSegment::as_field)
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut chars = input.chars().peekable();
        let mut current = String::new();
        // true right after a closing bracket, where a bare field name is not allowed
        let mut after_accessor = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() && !after_accessor {
                        return Err(PathError::EmptySegment(input.to_string()));
                    }
                    if !current.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut current)));
                    }
                    after_accessor = false;
                    if chars.peek().is_none() {
                        return Err(PathError::EmptySegment(input.to_string()));
                    }
                }
                '[' => {
                    if current.is_empty() && segments.is_empty() {
                        return Err(PathError::EmptySegment(input.to_string()));
                    }
                    if !current.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut current)));
                    }
                    let mut accessor = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        accessor.push(c);
                    }
                    if !closed {
                        return Err(PathError::Unterminated(input.to_string()));
                    }
                    segments.push(parse_accessor(input, &accessor)?);
                    after_accessor = true;
                }
                _ => {
                    if after_accessor {
                        return Err(PathError::InvalidAccessor {
                            path: input.to_string(),
                            accessor: c.to_string(),
                        });
                    }
                    current.push(c);
                }
            }
        }

        if !current.is_empty() {
            segments.push(PathSegment::Field(current));
        }

        Ok(Self { segments })
    }
}

fn parse_accessor(path: &str, accessor: &str) -> Result<PathSegment, PathError> {
    let trimmed = accessor.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        return Ok(PathSegment::Index(index));
    }

    let key = trimmed
        .strip_prefix("_key")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("=="))
        .map(str::trim)
        .and_then(|quoted| {
            quoted
                .strip_prefix('"')
                .and_then(|q| q.strip_suffix('"'))
                .or_else(|| quoted.strip_prefix('\'').and_then(|q| q.strip_suffix('\'')))
        });

    key.map(|key| PathSegment::Key(key.to_string()))
        .ok_or_else(|| PathError::InvalidAccessor {
            path: path.to_string(),
            accessor: accessor.to_string(),
        })
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[_key==\"{key}\"]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(input: &str) -> Vec<PathSegment> {
        input.parse::<FieldPath>().unwrap().segments().to_vec()
    }

    #[test]
    fn parses_dotted_fields() {
        assert_eq!(
            parse("author.name"),
            vec![
                PathSegment::Field("author".into()),
                PathSegment::Field("name".into())
            ]
        );
    }

    #[test]
    fn parses_index_and_key_accessors() {
        assert_eq!(
            parse("tags[0]"),
            vec![PathSegment::Field("tags".into()), PathSegment::Index(0)]
        );
        assert_eq!(
            parse(r#"sections[_key=="intro"].title"#),
            vec![
                PathSegment::Field("sections".into()),
                PathSegment::Key("intro".into()),
                PathSegment::Field("title".into()),
            ]
        );
    }

    #[test]
    fn field_names_skip_accessors() {
        let path: FieldPath = "sections[2].title".parse().unwrap();
        assert_eq!(path.field_names().collect::<Vec<_>>(), vec!["sections", "title"]);
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!("".parse::<FieldPath>(), Err(PathError::Empty));
        assert!(matches!("a..b".parse::<FieldPath>(), Err(PathError::EmptySegment(_))));
        assert!(matches!("a.".parse::<FieldPath>(), Err(PathError::EmptySegment(_))));
        assert!(matches!("tags[0".parse::<FieldPath>(), Err(PathError::Unterminated(_))));
        assert!(matches!(
            "tags[first]".parse::<FieldPath>(),
            Err(PathError::InvalidAccessor { .. })
        ));
    }

    #[test]
    fn display_normalizes_key_quotes() {
        let path: FieldPath = "sections[_key == 'a'].title".parse().unwrap();
        assert_eq!(path.to_string(), r#"sections[_key=="a"].title"#);
    }

    proptest! {
        #[test]
        fn dotted_identifiers_keep_their_segments(names in prop::collection::vec("[a-z][a-zA-Z0-9_]{0,8}", 1..5)) {
            let joined = names.join(".");
            let path: FieldPath = joined.parse().unwrap();
            prop_assert_eq!(path.field_names().collect::<Vec<_>>(), names.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(path.to_string(), joined);
        }
    }
}
