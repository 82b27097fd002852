//! Structure node ids
//!
//! Ids are derived from titles when not set explicitly: words are camel-cased
//! after stripping diacritics. Titles in other scripts are transliterated to
//! an ASCII slug first.

use crate::error::{HelpId, PathSegment, SerializeError};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Prefix reserved for the fallback editor pane
pub const EDIT_PREFIX: &str = "__edit__";

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9\-_.]").expect("id pattern is valid"));

/// Check an id against the allowed character set
///
/// # Errors
/// Fails when the id contains a disallowed character or starts with the
/// reserved `__edit__` prefix.
pub fn validate_id(id: &str, parent_path: &[String], segment: PathSegment) -> Result<(), SerializeError> {
    if let Some(found) = DISALLOWED.find(id) {
        return Err(SerializeError::new(
            format!("Structure node id cannot contain character \"{}\"", found.as_str()),
            parent_path,
            segment,
            None,
        )
        .with_help_id(HelpId::InvalidNodeId));
    }
    if id.starts_with(EDIT_PREFIX) {
        return Err(SerializeError::new(
            format!("Structure node id cannot start with {EDIT_PREFIX}"),
            parent_path,
            segment,
            None,
        )
        .with_help_id(HelpId::InvalidNodeId));
    }
    Ok(())
}

/// Effective id: the explicit one, else one derived from the title
#[must_use]
pub fn structure_node_id(id: Option<&str>, title: Option<&str>) -> Option<String> {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }
    let title = title?;
    let camel = camel_case(title);
    let derived = if DISALLOWED.is_match(&camel) {
        camel_case(&slugify(title))
    } else {
        camel
    };
    (!derived.is_empty()).then_some(derived)
}

/// Remove diacritics from Latin letters
#[must_use]
pub fn deburr(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Lower camel case of the words in `input`
#[must_use]
pub fn camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, word) in words(&deburr(input)).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Capitalized words separated by spaces (`blogPost` -> `Blog Post`)
#[must_use]
pub fn start_case(input: &str) -> String {
    words(&deburr(input))
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// Words are runs of alphanumerics, split again at lower-to-upper case changes
// and before the last capital of an acronym ("XMLHttp" -> "XML", "Http").
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    for run in input.split(|c: char| !c.is_alphanumeric()).filter(|run| !run.is_empty()) {
        let chars: Vec<char> = run.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if c.is_uppercase() => {
                    p.is_lowercase() || p.is_numeric() || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
                }
                _ => false,
            };
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// ASCII slug with Cyrillic and Greek transliterated letter by letter
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in deburr(input).chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if let Some(latin) = transliterate(c) {
            slug.push_str(latin);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' | 'α' => "a",
        'б' | 'β' => "b",
        'в' => "v",
        'г' | 'γ' => "g",
        'д' | 'δ' => "d",
        'е' | 'э' | 'ε' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' | 'ζ' => "z",
        'и' | 'ι' | 'η' => "i",
        'й' => "j",
        'к' | 'κ' => "k",
        'л' | 'λ' => "l",
        'м' | 'μ' => "m",
        'н' | 'ν' => "n",
        'о' | 'ο' | 'ω' => "o",
        'п' | 'π' => "p",
        'р' | 'ρ' => "r",
        'с' | 'σ' | 'ς' => "s",
        'т' | 'τ' => "t",
        'у' | 'υ' => "u",
        'ф' | 'φ' => "f",
        'х' | 'χ' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'θ' => "th",
        'ξ' => "x",
        'ψ' => "ps",
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(latin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn camel_cases_titles() {
        assert_eq!(camel_case("Not so deep"), "notSoDeep");
        assert_eq!(camel_case("Even More Nested List"), "evenMoreNestedList");
        assert_eq!(camel_case("some-kebab_case"), "someKebabCase");
        assert_eq!(camel_case("XMLHttp request"), "xmlHttpRequest");
        assert_eq!(camel_case("Crème brûlée"), "cremeBrulee");
    }

    #[test]
    fn start_cases_type_names() {
        assert_eq!(start_case("blogPost"), "Blog Post");
        assert_eq!(start_case("author"), "Author");
        assert_eq!(start_case("site_settings"), "Site Settings");
    }

    #[test]
    fn explicit_id_wins() {
        assert_eq!(structure_node_id(Some("altBookId"), Some("Sick Books")).as_deref(), Some("altBookId"));
        assert_eq!(structure_node_id(None, Some("Sick Books")).as_deref(), Some("sickBooks"));
        assert_eq!(structure_node_id(Some(""), Some("Books")).as_deref(), Some("books"));
    }

    #[test]
    fn nothing_to_derive_from() {
        assert_eq!(structure_node_id(None, None), None);
        assert_eq!(structure_node_id(None, Some("  !! ")), None);
    }

    #[test]
    fn non_latin_titles_are_transliterated() {
        assert_eq!(structure_node_id(None, Some("Книги")).as_deref(), Some("knigi"));
        assert_eq!(structure_node_id(None, Some("Βιβλία")).as_deref(), Some("biblia"));
    }

    #[test]
    fn rejects_disallowed_characters() {
        let err = validate_id("foo bar", &[], PathSegment::Index(0)).unwrap_err();
        assert_eq!(err.message(), "Structure node id cannot contain character \" \"");
        assert_eq!(err.help_id(), Some(HelpId::InvalidNodeId));
        assert!(validate_id("foo-bar_baz.1", &[], PathSegment::Unknown).is_ok());
    }

    #[test]
    fn rejects_edit_prefix() {
        let err = validate_id("__edit__x", &["root".into()], PathSegment::Id("__edit__x".into())).unwrap_err();
        assert_eq!(err.message(), "Structure node id cannot start with __edit__");
        assert_eq!(err.path(), ["root", "__edit__x"]);
    }

    proptest! {
        #[test]
        fn derived_ids_always_validate(title in "\\PC{0,24}") {
            if let Some(id) = structure_node_id(None, Some(&title)) {
                prop_assert!(validate_id(&id, &[], PathSegment::Unknown).is_ok());
            }
        }
    }
}
