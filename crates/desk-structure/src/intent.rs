//! Intents and the checks panes use to claim them

use crate::node::PaneNode;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Open a document for editing
pub const EDIT: &str = "edit";

/// Create a new document
pub const CREATE: &str = "create";

/// Canonical filter of lists showing every document of one type
pub const DEFAULT_TYPE_FILTER: &str = "_type == $type";

/// String parameters accompanying an intent (`id`, `type`, `template`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentParams(IndexMap<String, String>);

impl IntentParams {
    /// Create empty params
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an additional parameter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get parameter
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Target document id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Target schema type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.get("type")
    }

    /// Initial value template id
    #[inline]
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.get("template")
    }

    /// Copy without the given keys, order preserved
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> IndexMap<String, String> {
        self.0
            .iter()
            .filter(|(key, _)| !keys.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Iterate parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Underlying map
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IntentParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Pane and position handed to an intent check
#[derive(Debug, Clone, Copy)]
pub struct IntentContext<'a> {
    pub pane: &'a PaneNode,
    /// Flat traversal index of the pane
    pub index: usize,
}

type CheckFn = dyn Fn(&str, &IntentParams, IntentContext<'_>) -> bool + Send + Sync;

/// Predicate deciding whether a pane can handle an intent
#[derive(Clone)]
pub struct IntentChecker(Arc<CheckFn>);

impl IntentChecker {
    /// Wrap a custom check
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&str, &IntentParams, IntentContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Check that accepts every intent
    #[must_use]
    pub fn always() -> Self {
        Self::new(|_, _, _| true)
    }

    /// Matches `edit` and `create` against the pane's type names
    #[must_use]
    pub fn default_checker() -> Self {
        Self::new(default_intent_check)
    }

    /// Like [`IntentChecker::default_checker`], but only near the root
    #[must_use]
    pub fn shallow() -> Self {
        Self::new(|intent, params, ctx| ctx.index <= 1 && default_intent_check(intent, params, ctx))
    }

    /// Run the check
    #[inline]
    #[must_use]
    pub fn check(&self, intent: &str, params: &IntentParams, ctx: IntentContext<'_>) -> bool {
        (self.0)(intent, params, ctx)
    }
}

impl fmt::Debug for IntentChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IntentChecker(..)")
    }
}

fn default_intent_check(intent: &str, params: &IntentParams, ctx: IntentContext<'_>) -> bool {
    let is_edit = intent == EDIT;
    let is_create = intent == CREATE;

    if is_create {
        if let Some(template) = params.template() {
            return ctx
                .pane
                .initial_value_templates()
                .iter()
                .any(|item| item.template_id == template);
        }
    }

    let Some(type_name) = params.type_name() else {
        return false;
    };
    let type_names = ctx.pane.type_names();
    let handles_type = type_names.iter().any(|name| name == type_name);

    (is_edit && params.id().is_some_and(|id| !id.is_empty()) && handles_type) || (is_create && handles_type)
}

static EQUALITY_FILTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b_type\s*==\s*(['"].*?['"]|\$.*?(?:\s|$))|\B(['"].*?['"]|\$.*?(?:\s|$))\s*==\s*_type"#)
        .expect("equality filter pattern is valid")
});

static IN_TYPES_FILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b_type\s+in\s+\[(.*?)\]").expect("in-types filter pattern is valid"));

/// Type names a filter restricts documents to
///
/// Understands `_type == "x"`, `"x" == _type`, `_type == $param` and
/// `_type in ["a", $b]`. Parameters that are not strings are ignored.
#[must_use]
pub fn type_names_from_filter(filter: &str, params: &IndexMap<String, serde_json::Value>) -> Vec<String> {
    let names = type_names_from_equality(filter, params);
    if names.is_empty() {
        type_names_from_in_types(filter, params)
    } else {
        names
    }
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn lookup_param(params: &IndexMap<String, serde_json::Value>, name: &str) -> Option<String> {
    params.get(name).and_then(serde_json::Value::as_str).map(str::to_string)
}

fn type_names_from_equality(filter: &str, params: &IndexMap<String, serde_json::Value>) -> Vec<String> {
    EQUALITY_FILTER
        .captures_iter(filter)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|candidate| {
            let candidate = candidate.as_str();
            let name = match candidate.strip_prefix('$') {
                Some(param) => lookup_param(params, param.trim())?,
                None => candidate.to_string(),
            };
            let name = name.trim().trim_matches(is_quote);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

fn type_names_from_in_types(filter: &str, params: &IndexMap<String, serde_json::Value>) -> Vec<String> {
    let Some(caps) = IN_TYPES_FILTER.captures(filter) else {
        return Vec::new();
    };
    caps.get(1)
        .map(|list| list.as_str())
        .unwrap_or_default()
        .split(',')
        .map(|item| item.trim().trim_matches(is_quote))
        .filter_map(|item| match item.strip_prefix('$') {
            Some(param) => lookup_param(params, param),
            None => Some(item.to_string()),
        })
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, serde_json::Value)]) -> IndexMap<String, serde_json::Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn extracts_equality_filters() {
        let none = IndexMap::new();
        assert_eq!(type_names_from_filter(r#"_type == "movie""#, &none), vec!["movie"]);
        assert_eq!(type_names_from_filter(r#"'movie' == _type"#, &none), vec!["movie"]);
        assert_eq!(
            type_names_from_filter(r#"_type == "movie" || _type == $other"#, &params(&[("other", json!("book"))])),
            vec!["movie", "book"]
        );
        assert_eq!(
            type_names_from_filter(DEFAULT_TYPE_FILTER, &params(&[("type", json!("book"))])),
            vec!["book"]
        );
    }

    #[test]
    fn extracts_in_types_filters() {
        let found = type_names_from_filter(
            r#"_type in ["dog", 'cat', $species]"#,
            &params(&[("species", json!("bird"))]),
        );
        assert_eq!(found, vec!["dog", "cat", "bird"]);
    }

    #[test]
    fn unresolvable_params_are_dropped() {
        let found = type_names_from_filter("_type == $missing", &IndexMap::new());
        assert!(found.is_empty());
        let found = type_names_from_filter("_type == $count", &params(&[("count", json!(3))]));
        assert!(found.is_empty());
        assert!(type_names_from_filter("defined(slug)", &IndexMap::new()).is_empty());
    }

    #[test]
    fn params_without_keys_keep_order() {
        let params: IntentParams = [("id", "a"), ("type", "book"), ("view", "preview")]
            .into_iter()
            .collect();
        let rest = params.without(&["id"]);
        assert_eq!(rest.keys().collect::<Vec<_>>(), vec!["type", "view"]);
        assert_eq!(params.type_name(), Some("book"));
    }
}
