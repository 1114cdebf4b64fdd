//! Spreadsheet cell references (e.g., A1, C7)

use serde::Serialize;

/// Worksheet limits of the xlsx format (1,048,576 rows, columns A..XFD)
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLUMNS: usize = 16_384;

/// Zero-based cell position, rendered as a 1-based Excel-style reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellReference {
    pub row: usize,
    pub col: usize,
}

impl CellReference {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", col_to_letters(self.col), self.row + 1)
    }
}

impl std::fmt::Display for CellReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

/// Render a zero-based column and zero-based row as a reference string
pub fn cell_ref(col: usize, row: usize) -> String {
    CellReference::new(row, col).to_excel_ref()
}

/// Convert column number to letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// Column index (0-based) of a reference like "C7", ignoring the row part.
///
/// `None` without leading letters or beyond column XFD.
pub fn parse_col(reference: &str) -> Option<usize> {
    let mut col = 0usize;
    let mut letters = 0;
    for ch in reference.chars().take_while(|ch| ch.is_ascii_alphabetic()) {
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
        letters += 1;
    }
    if letters == 0 || col > MAX_COLUMNS {
        return None;
    }
    Some(col - 1)
}
