//! Workbook data structures

use serde::Serialize;
use std::fmt;

static EMPTY: CellValue = CellValue::Empty;

/// A worksheet declared in `xl/workbook.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDef {
    pub name: String,
    /// Relationship id (`r:id`) pointing into `xl/_rels/workbook.xml.rels`
    pub relationship_id: String,
}

/// Cell value types
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Coerce raw cell text: integer first, then decimal, otherwise text
    pub fn from_raw(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            CellValue::Integer(n)
        } else if let Ok(n) = raw.parse::<f64>() {
            CellValue::Float(n)
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True for empty cells and empty text. Numeric zero is a value.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Integer(_) | CellValue::Float(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the cell; integers widen to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::Float(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One worksheet materialized as rows of cell values.
///
/// Rows may have different lengths; any position outside a row reads as
/// [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get the cell at the given position
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_order() {
        assert_eq!(CellValue::from_raw("42"), CellValue::Integer(42));
        assert_eq!(CellValue::from_raw("-7"), CellValue::Integer(-7));
        assert_eq!(CellValue::from_raw("3.5"), CellValue::Float(3.5));
        assert_eq!(CellValue::from_raw("1e3"), CellValue::Float(1000.0));
        assert_eq!(CellValue::from_raw("abc"), CellValue::Text("abc".into()));
        assert_eq!(CellValue::from_raw(""), CellValue::Text(String::new()));
    }

    #[test]
    fn test_zero_is_not_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text(String::new()).is_blank());
        assert!(!CellValue::Integer(0).is_blank());
        assert!(!CellValue::Float(0.0).is_blank());
        assert!(!CellValue::from("x").is_blank());
    }

    #[test]
    fn test_out_of_range_cells_are_empty() {
        let grid = Grid::from_rows(vec![vec![CellValue::from(1)], vec![]]);
        assert_eq!(grid.cell(0, 0), &CellValue::Integer(1));
        assert!(grid.cell(0, 5).is_empty());
        assert!(grid.cell(1, 0).is_empty());
        assert!(grid.cell(9, 9).is_empty());
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn test_display_and_numeric_views() {
        assert_eq!(CellValue::Float(2.0).to_string(), "2");
        assert_eq!(CellValue::Integer(500).to_string(), "500");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::from("3").as_f64(), None);
    }
}
