//! paramsheet: parameter tables from xlsx workbooks
//!
//! A minimal OOXML reader that turns one worksheet into a dense grid, and a
//! layout-tolerant extractor that finds the header row, the header column and
//! every configuration group of a parameter table.

pub mod cell_ref;
pub mod config;
pub mod extract;
pub mod reader;

use log::info;
use std::path::Path;
use thiserror::Error;

pub use cell_ref::{CellReference, cell_ref, col_to_letters};
pub use config::{ConfigError, ExtractorConfig};
pub use extract::{
    BatchParameters, Concept, ExtractError, ParameterSet, TableExtractor, TableLayout,
    extract_batch_parameters,
};
pub use reader::{CellValue, Grid, ReadError, SheetDef, XlsxWorkbook};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Open `path`, load the configured sheet and extract its parameter sets
pub fn load_batch_parameters<P: AsRef<Path>>(
    path: P,
    config: &ExtractorConfig,
) -> Result<BatchParameters, Error> {
    let mut workbook = XlsxWorkbook::open(path)?;
    let index = config.sheet_index;
    let name = workbook.sheet_name(index)?;
    info!("Loading parameters from sheet #{} ('{}')", index + 1, name);
    let grid = workbook.load_sheet_data(index)?;
    Ok(extract_batch_parameters(&grid, &config.layout)?)
}
