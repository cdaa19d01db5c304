//! Fuzzy query configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Alias of the aggregate relevance column unless configured otherwise
pub const DEFAULT_RELEVANCE_ALIAS: &str = "_fuzzy_relevance_";

/// Configuration applied to every fuzzy query built from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Whether a fuzzy term orders results by relevance unless it says otherwise
    pub default_ordering: bool,
    /// Alias of the projected aggregate relevance column
    pub relevance_alias: String,
    /// Prefix of the projected per-field relevance columns
    pub field_alias_prefix: String,
    /// Project relevance columns into the select list
    pub project_relevance: bool,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            default_ordering: true,
            relevance_alias: DEFAULT_RELEVANCE_ALIAS.to_string(),
            field_alias_prefix: "fuzzy_relevance_".to_string(),
            project_relevance: true,
        }
    }
}

impl FuzzyConfig {
    /// Parse a configuration from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Alias for a field's relevance column (`users.name` -> `fuzzy_relevance_users_name`)
    pub fn field_alias(&self, field: &str) -> String {
        let suffix: String = field
            .trim_matches(|c| c == '`' || c == '"' || c == ' ')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}{}", self.field_alias_prefix, suffix)
    }
}
