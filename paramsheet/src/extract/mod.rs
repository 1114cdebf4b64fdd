//! Layout-tolerant extraction of parameter sets from a worksheet grid

use thiserror::Error;

pub mod batch;
pub mod concept;
pub mod table;

pub use batch::{BatchParameters, ParameterSet};
pub use concept::{Concept, TableLayout};
pub use table::TableExtractor;

use crate::cell_ref::CellReference;
use crate::reader::Grid;

/// Errors raised while extracting parameter sets. Extraction is all-or-nothing.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No row contains the code header
    #[error("{}", .concept.describe_missing("Column header", "column headers"))]
    MissingHeaderRow { concept: Concept },
    /// No row above the header row contains the name row header
    #[error("{}", .concept.describe_missing("Row header", "row headers"))]
    MissingHeaderColumn { concept: Concept },
    #[error("{}", .concept.describe_missing("Row header", "row headers"))]
    MissingRowHeader { concept: Concept },
    #[error(
        "{} for parameter set \"{set_name}\"",
        .concept.describe_missing("Column", "columns")
    )]
    MissingColumn { concept: Concept, set_name: String },
    #[error("Expected {concept} value in cell {cell}")]
    MissingCell {
        concept: String,
        cell: CellReference,
    },
    #[error("Column \"{column}\" of parameter set \"{set_name}\" has {actual} values, expected {expected}")]
    ColumnLength {
        column: String,
        set_name: String,
        expected: usize,
        actual: usize,
    },
}

/// Extract parameter sets from `grid` using `layout`
pub fn extract_batch_parameters(
    grid: &Grid,
    layout: &TableLayout,
) -> Result<BatchParameters, ExtractError> {
    TableExtractor::new(layout).extract(grid)
}
