//! Extractor configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::{Concept, TableLayout};

/// File name looked up in the working directory when no config is given
pub const DEFAULT_CONFIG_FILE: &str = "paramsheet.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Which sheet to read and which labels to look for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Zero-based index of the parameter sheet
    #[serde(default)]
    pub sheet_index: usize,
    #[serde(default)]
    pub layout: TableLayout,
}

impl ExtractorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExtractorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty labels and concepts sharing a canonical name
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        let all: Vec<&Concept> = std::iter::once(&layout.code_header)
            .chain(layout.row_headers())
            .chain(layout.columns.iter())
            .collect();

        for concept in &all {
            if concept.accepted().iter().any(|label| label.is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "empty label in concept \"{}\"",
                    concept.canonical()
                )));
            }
        }

        let mut seen = HashSet::new();
        for concept in &all {
            if !seen.insert(concept.canonical()) {
                return Err(ConfigError::Invalid(format!(
                    "concept \"{}\" is defined more than once",
                    concept.canonical()
                )));
            }
        }

        Ok(())
    }

    pub fn with_sheet_index(mut self, sheet_index: usize) -> Self {
        self.sheet_index = sheet_index;
        self
    }

    /// Every column concept, for callers that list required columns
    pub fn column_concepts(&self) -> &[Concept] {
        &self.layout.columns
    }
}
