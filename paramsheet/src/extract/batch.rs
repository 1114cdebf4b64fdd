//! Extracted parameter sets

use serde::Serialize;
use std::collections::BTreeMap;

use super::{Concept, ExtractError};
use crate::reader::CellValue;

/// One configuration group of the parameter table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    /// Scalar row-header values keyed by canonical name
    pub parameters: BTreeMap<String, CellValue>,
    /// Data columns keyed by canonical name (other columns keep their label)
    pub columns: BTreeMap<String, Vec<CellValue>>,
    #[serde(skip)]
    name_key: String,
}

impl ParameterSet {
    /// `name_key` is the parameter holding the set's name
    pub fn new(
        parameters: BTreeMap<String, CellValue>,
        columns: BTreeMap<String, Vec<CellValue>>,
        name_key: impl Into<String>,
    ) -> Self {
        Self {
            parameters,
            columns,
            name_key: name_key.into(),
        }
    }

    /// Value of the name parameter (empty if absent)
    pub fn name(&self) -> String {
        self.parameters
            .get(&self.name_key)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Look up a parameter by any of the concept's accepted labels
    pub fn parameter(&self, concept: &Concept) -> Option<&CellValue> {
        concept
            .accepted()
            .iter()
            .find_map(|label| self.parameters.get(label))
    }

    /// Look up a column by any of the concept's accepted labels
    pub fn column(&self, concept: &Concept) -> Option<&[CellValue]> {
        concept
            .accepted()
            .iter()
            .find_map(|label| self.columns.get(label))
            .map(Vec::as_slice)
    }
}

/// Everything extracted from one parameter table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchParameters {
    /// One code per category row, shared by all parameter sets
    pub row_category_codes: Vec<CellValue>,
    pub parameter_sets: Vec<ParameterSet>,
}

impl BatchParameters {
    /// Fails if any column length differs from the number of codes
    pub fn new(
        row_category_codes: Vec<CellValue>,
        parameter_sets: Vec<ParameterSet>,
    ) -> Result<Self, ExtractError> {
        let expected = row_category_codes.len();
        for set in &parameter_sets {
            if let Some((label, values)) = set.columns.iter().find(|(_, v)| v.len() != expected) {
                return Err(ExtractError::ColumnLength {
                    column: label.clone(),
                    set_name: set.name(),
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(Self {
            row_category_codes,
            parameter_sets,
        })
    }

    pub fn set_names(&self) -> Vec<String> {
        self.parameter_sets.iter().map(ParameterSet::name).collect()
    }

    /// Category codes whose value in `set`'s column satisfies `keep`.
    ///
    /// Empty if the set has no such column.
    pub fn codes_where<F>(&self, set: &ParameterSet, concept: &Concept, mut keep: F) -> Vec<&CellValue>
    where
        F: FnMut(&CellValue) -> bool,
    {
        let Some(values) = set.column(concept) else {
            return Vec::new();
        };
        self.row_category_codes
            .iter()
            .zip(values)
            .filter(|&(_, value)| keep(value))
            .map(|(code, _)| code)
            .collect()
    }
}
