//! Desk file configuration
//!
//! A desk file is YAML with the schema, an optional structure tree, default
//! document node settings per schema type, and logging options.

use crate::structure_file::{DocumentNodeSpec, NodeSpec};
use anyhow::Context;
use desk_schema::TypeDef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Ordering projection options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Fail on unknown ordering fields instead of dropping them
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSection {
    pub types: Vec<TypeDef>,
}

/// Parsed desk file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeskFile {
    pub schema: SchemaSection,
    /// Root pane, the default structure when absent
    pub structure: Option<NodeSpec>,
    pub document_nodes: IndexMap<String, DocumentNodeSpec>,
    pub log: LogConfig,
    pub projection: ProjectionConfig,
}

impl DeskFile {
    /// Parse a desk file from YAML
    ///
    /// # Errors
    /// Returns the YAML error for malformed or mistyped input.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Read and parse the desk file at `path`
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source =
            std::fs::read_to_string(path).with_context(|| format!("failed to read desk file {}", path.display()))?;
        Self::from_yaml(&source).with_context(|| format!("failed to parse desk file {}", path.display()))
    }
}
