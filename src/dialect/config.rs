//! YAML configuration for extending the dialect rules.

use crate::error::DumpError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One literal cleanup replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Complete YAML configuration for dialect overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectYamlConfig {
    /// Extra or overriding type translations (exact MySQL spelling → PostgreSQL)
    pub types: HashMap<String, String>,
    /// Extra line prefixes to discard
    pub drop_prefixes: Vec<String>,
    /// Extra literal replacements
    pub replacements: Vec<Replacement>,
}

impl DialectYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, DumpError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| DumpError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, DumpError> {
        let config: DialectYamlConfig =
            serde_yaml_ng::from_str(yaml).map_err(|e| DumpError::Config(e.to_string()))?;

        if config.replacements.iter().any(|r| r.from.is_empty()) {
            return Err(DumpError::Config(
                "replacement with empty 'from' pattern".to_string(),
            ));
        }
        if config.drop_prefixes.iter().any(|p| p.is_empty()) {
            return Err(DumpError::Config(
                "empty drop prefix would discard every line".to_string(),
            ));
        }

        Ok(config)
    }
}
