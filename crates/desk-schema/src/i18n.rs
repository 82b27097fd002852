use serde::{Deserialize, Serialize};

/// Key and namespace used to look up a localized title.
///
/// When present it takes precedence over a plain title, which stays around
/// as the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct I18nTitle {
    /// Translation key
    pub key: String,
    /// Translation namespace
    pub ns: String,
}

impl I18nTitle {
    /// Create new i18n title record
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, ns: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ns: ns.into(),
        }
    }
}
