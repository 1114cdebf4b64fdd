//! Header detection and configuration-group partitioning

use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

use super::{BatchParameters, Concept, ExtractError, ParameterSet, TableLayout};
use crate::cell_ref::CellReference;
use crate::reader::{CellValue, Grid};

/// Where the table's headers were found
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderRegion {
    /// Row holding the code header and the data-column labels
    header_row: usize,
    /// Column holding the row-header labels
    header_col: usize,
    /// Column holding the category codes
    code_col: usize,
    /// Row-header label -> row index (last occurrence wins)
    row_headers: HashMap<String, usize>,
}

/// Turns a grid into [`BatchParameters`] according to a [`TableLayout`]
pub struct TableExtractor<'a> {
    layout: &'a TableLayout,
}

impl<'a> TableExtractor<'a> {
    pub fn new(layout: &'a TableLayout) -> Self {
        Self { layout }
    }

    pub fn extract(&self, grid: &Grid) -> Result<BatchParameters, ExtractError> {
        let region = self.locate_headers(grid)?;
        let row_headers = self.resolve_row_headers(&region)?;

        let first_data_row = region.header_row + 1;
        let code_count = grid.row_count() - first_data_row;
        let codes = column_values(
            grid,
            region.code_col,
            first_data_row,
            code_count,
            self.layout.code_header.canonical(),
        )?;

        let name_row = row_headers[0].1;
        let mut parameter_sets = Vec::new();
        let mut col = region.header_col + 1;
        while let Some(start) = next_group_start(grid, region.header_row, name_row, col) {
            let (set, next) = self.read_group(grid, &region, &row_headers, start, code_count)?;
            debug!(
                "Parameter set '{}' spans columns {}..{}",
                set.name(),
                start,
                next
            );
            parameter_sets.push(set);
            col = next;
        }

        let batch = BatchParameters::new(codes, parameter_sets)?;
        info!(
            "Found {} parameter sets: {:?}",
            batch.parameter_sets.len(),
            batch.set_names()
        );
        Ok(batch)
    }

    fn locate_headers(&self, grid: &Grid) -> Result<HeaderRegion, ExtractError> {
        let (header_row, code_col) =
            self.find_header_row(grid)
                .ok_or_else(|| ExtractError::MissingHeaderRow {
                    concept: self.layout.code_header.clone(),
                })?;
        let header_col = self.find_header_col(grid, header_row).ok_or_else(|| {
            ExtractError::MissingHeaderColumn {
                concept: self.layout.name.clone(),
            }
        })?;
        debug!(
            "Header row {}, header column {}, code column {}",
            header_row + 1,
            header_col,
            code_col
        );

        let mut row_headers = HashMap::new();
        for row in 0..header_row {
            let label = grid.cell(row, header_col);
            if !label.is_blank() {
                row_headers.insert(label.to_string(), row);
            }
        }

        Ok(HeaderRegion {
            header_row,
            header_col,
            code_col,
            row_headers,
        })
    }

    /// First row containing a code-header label, with the label's column
    fn find_header_row(&self, grid: &Grid) -> Option<(usize, usize)> {
        grid.rows().iter().enumerate().find_map(|(row_index, row)| {
            self.layout.code_header.accepted().iter().find_map(|label| {
                row.iter()
                    .position(|cell| cell.as_text() == Some(label.as_str()))
                    .map(|col| (row_index, col))
            })
        })
    }

    /// First column above the header row holding a name label
    fn find_header_col(&self, grid: &Grid, header_row: usize) -> Option<usize> {
        grid.rows()[..header_row].iter().find_map(|row| {
            row.iter().position(|cell| {
                cell.as_text()
                    .is_some_and(|text| self.layout.name.matches(text))
            })
        })
    }

    /// Row index of every row-header concept, name first
    fn resolve_row_headers(
        &self,
        region: &HeaderRegion,
    ) -> Result<Vec<(&'a Concept, usize)>, ExtractError> {
        let layout: &'a TableLayout = self.layout;
        layout
            .row_headers()
            .map(|concept| {
                concept
                    .lookup(&region.row_headers)
                    .map(|&row| (concept, row))
                    .ok_or_else(|| ExtractError::MissingRowHeader {
                        concept: concept.clone(),
                    })
            })
            .collect()
    }

    /// Read the group starting at `start`; returns it with the first column after it
    fn read_group(
        &self,
        grid: &Grid,
        region: &HeaderRegion,
        row_headers: &[(&Concept, usize)],
        start: usize,
        code_count: usize,
    ) -> Result<(ParameterSet, usize), ExtractError> {
        let mut parameters = BTreeMap::new();
        for (concept, row) in row_headers {
            let value = grid.cell(*row, start);
            if value.is_blank() {
                return Err(ExtractError::MissingCell {
                    concept: concept.canonical().to_string(),
                    cell: CellReference::new(*row, start),
                });
            }
            parameters.insert(concept.canonical().to_string(), value.clone());
        }
        let name_key = self.layout.name.canonical();
        let set_name = parameters
            .get(name_key)
            .map(ToString::to_string)
            .unwrap_or_default();

        let name_row = row_headers[0].1;
        let width = grid.width();
        let mut captured: HashMap<String, Vec<CellValue>> = HashMap::new();
        let mut col = start;
        loop {
            let label = grid.cell(region.header_row, col);
            if label.is_blank() {
                break;
            }
            let label = label.to_string();
            let values = column_values(grid, col, region.header_row + 1, code_count, &label)?;
            captured.insert(label, values);

            col += 1;
            if col >= width || !grid.cell(name_row, col).is_blank() {
                break;
            }
        }

        let mut columns = BTreeMap::new();
        for concept in &self.layout.columns {
            let values = concept
                .lookup(&captured)
                .ok_or_else(|| ExtractError::MissingColumn {
                    concept: concept.clone(),
                    set_name: set_name.clone(),
                })?;
            columns.insert(concept.canonical().to_string(), values.clone());
        }
        for (label, values) in captured {
            if self.layout.column_concept(&label).is_none() {
                columns.insert(label, values);
            }
        }

        Ok((ParameterSet::new(parameters, columns, name_key), col))
    }
}

/// Column where the next group starts, if any.
///
/// Groups may sit directly next to each other or be separated by spacer
/// columns whose header and name cells are both blank.
fn next_group_start(grid: &Grid, header_row: usize, name_row: usize, col: usize) -> Option<usize> {
    if !grid.cell(header_row, col).is_blank() {
        return Some(col);
    }

    let width = grid.width();
    let mut next = col;
    while next < width
        && grid.cell(header_row, next).is_blank()
        && grid.cell(name_row, next).is_blank()
    {
        next += 1;
    }

    if next < width
        && !grid.cell(header_row, next).is_blank()
        && !grid.cell(name_row, next).is_blank()
    {
        debug!("Skipped spacer columns {}..{}", col, next);
        Some(next)
    } else {
        None
    }
}

/// `count` non-blank values going down from `first_row`
fn column_values(
    grid: &Grid,
    col: usize,
    first_row: usize,
    count: usize,
    concept: &str,
) -> Result<Vec<CellValue>, ExtractError> {
    (first_row..first_row + count)
        .map(|row| {
            let value = grid.cell(row, col);
            if value.is_blank() {
                Err(ExtractError::MissingCell {
                    concept: concept.to_string(),
                    cell: CellReference::new(row, col),
                })
            } else {
                Ok(value.clone())
            }
        })
        .collect()
}
