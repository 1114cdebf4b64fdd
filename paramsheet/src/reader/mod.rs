//! XLSX package reader using custom XML parsers

use std::path::PathBuf;
use thiserror::Error;

pub mod parser_utils;
pub mod workbook;
pub mod xlsx_parser;

pub use workbook::{CellValue, Grid, SheetDef};
pub use xlsx_parser::XlsxWorkbook;

/// Errors raised while opening a package or materializing a worksheet.
///
/// `Io`, `Zip`, `MissingPart`, `Xml` and `UnresolvedRelationship` mean the
/// package itself is unusable; `Format` means one worksheet is malformed or
/// structurally empty.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a readable zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("missing package part: {0}")]
    MissingPart(String),
    #[error("malformed XML in {part}: {reason}")]
    Xml { part: String, reason: String },
    #[error("sheet '{sheet}' refers to unknown relationship '{id}'")]
    UnresolvedRelationship { sheet: String, id: String },
    #[error("sheet index {index} out of range ({count} sheets)")]
    SheetIndex { index: usize, count: usize },
    #[error("malformed worksheet {part}: {reason}")]
    Format { part: String, reason: String },
}

impl ReadError {
    pub(crate) fn xml(part: &str, reason: impl ToString) -> Self {
        ReadError::Xml {
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn format(part: &str, reason: impl Into<String>) -> Self {
        ReadError::Format {
            part: part.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the archive or one of its required parts is unusable
    pub fn is_package_error(&self) -> bool {
        matches!(
            self,
            ReadError::Io { .. }
                | ReadError::Zip(_)
                | ReadError::MissingPart(_)
                | ReadError::Xml { .. }
                | ReadError::UnresolvedRelationship { .. }
        )
    }
}
