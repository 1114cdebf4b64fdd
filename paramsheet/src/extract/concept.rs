//! Row-header and column-header concepts with their accepted labels

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A logical field that may appear in the sheet under several labels.
///
/// `accepted[0]` is always the canonical label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConceptEntry", into = "ConceptEntry")]
pub struct Concept {
    accepted: Vec<String>,
}

impl Concept {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            accepted: vec![canonical.into()],
        }
    }

    pub fn with_synonyms<I, S>(canonical: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut accepted = vec![canonical.into()];
        for synonym in synonyms {
            let synonym = synonym.into();
            if !accepted.contains(&synonym) {
                accepted.push(synonym);
            }
        }
        Self { accepted }
    }

    pub fn canonical(&self) -> &str {
        &self.accepted[0]
    }

    /// Accepted labels in lookup order, canonical first
    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub fn has_synonyms(&self) -> bool {
        self.accepted.len() > 1
    }

    pub fn matches(&self, label: &str) -> bool {
        self.accepted.iter().any(|a| a == label)
    }

    /// First accepted label present in `map`, tried in order
    pub fn lookup<'m, V>(&self, map: &'m HashMap<String, V>) -> Option<&'m V> {
        self.accepted.iter().find_map(|label| map.get(label))
    }

    /// Human-readable description for error messages
    pub(crate) fn describe_missing(&self, singular: &str, plural: &str) -> String {
        if self.has_synonyms() {
            format!(
                "None of the following {} were found: \"{}\"",
                plural,
                self.accepted.join("\", \"")
            )
        } else {
            format!("{} \"{}\" not found", singular, self.canonical())
        }
    }
}

/// Serialized form: `{ name = "Source", synonyms = ["Reproduction"] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConceptEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    synonyms: Vec<String>,
}

impl From<ConceptEntry> for Concept {
    fn from(entry: ConceptEntry) -> Self {
        Concept::with_synonyms(entry.name, entry.synonyms)
    }
}

impl From<Concept> for ConceptEntry {
    fn from(concept: Concept) -> Self {
        let mut accepted = concept.accepted.into_iter();
        ConceptEntry {
            name: accepted.next().unwrap_or_default(),
            synonyms: accepted.collect(),
        }
    }
}

/// The labels the extractor looks for in a parameter table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Header of the category-code column; its row is the table header row
    #[serde(default = "default_code_header")]
    pub code_header: Concept,
    /// Row header naming each parameter set; locates the header column
    #[serde(default = "default_name")]
    pub name: Concept,
    /// Further required row headers read as scalar parameters
    #[serde(default = "default_parameters")]
    pub parameters: Vec<Concept>,
    /// Required data columns of every parameter set
    #[serde(default = "default_columns")]
    pub columns: Vec<Concept>,
}

impl TableLayout {
    /// Name concept followed by the other row-header concepts
    pub fn row_headers(&self) -> impl Iterator<Item = &Concept> {
        std::iter::once(&self.name).chain(self.parameters.iter())
    }

    /// Concept a captured column label belongs to, if any
    pub fn column_concept(&self, label: &str) -> Option<&Concept> {
        self.columns.iter().find(|c| c.matches(label))
    }
}

impl Default for TableLayout {
    /// Habitat network parameter table
    fn default() -> Self {
        Self {
            code_header: default_code_header(),
            name: default_name(),
            parameters: default_parameters(),
            columns: default_columns(),
        }
    }
}

fn default_code_header() -> Concept {
    Concept::new("BiotopeCode")
}

fn default_name() -> Concept {
    Concept::new("Network name")
}

fn default_parameters() -> Vec<Concept> {
    vec![
        Concept::new("Average dispersal distance (metres)"),
        Concept::with_synonyms("Network threshold", ["Minimum dispersal probability"]),
    ]
}

fn default_columns() -> Vec<Concept> {
    vec![
        Concept::new("Quality"),
        Concept::with_synonyms("Source", ["Reproduction"]),
        Concept::new("Friction"),
    ]
}
