//! Tabular store contract.
//!
//! The tracker treats its spreadsheet as a generic tabular key-value store:
//! full-sheet snapshot reads, best-effort batched writes, no transactional
//! guarantees. Humans may hand-edit the sheet between passes.

use billtrack_core::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::SheetError;

/// One dirty cell in a batched update. `row` is 1-based (header row is 1),
/// `col` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

impl CellUpdate {
    /// A1 reference for this cell.
    pub fn a1(&self) -> String {
        format!("{}{}", col_letters(self.col), self.row)
    }
}

/// Cosmetic cell formatting applied by the one-time formatting pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub center: bool,
    pub date_format: bool,
}

/// The store operations the sync core consumes.
///
/// Every read is a full-sheet snapshot; every write is a best-effort batch.
pub trait SheetStore {
    /// Row 1 of the sheet: the column headers.
    fn read_header_row(&self) -> Result<Vec<String>, SheetError>;

    /// All data rows (row 2 onward), each padded to the header width.
    fn read_all_records(&self, headers: &HeaderMap) -> Result<Vec<Vec<String>>, SheetError>;

    /// Apply all dirty cells in one call; sheet APIs rate-limit per call,
    /// never per cell.
    fn batch_update(&mut self, updates: &[CellUpdate]) -> Result<(), SheetError>;

    /// Apply cosmetic formatting to an A1 range.
    fn format_range(&mut self, range: &str, style: &CellStyle) -> Result<(), SheetError>;
}

// ---------------------------------------------------------------------------
// A1 helpers
// ---------------------------------------------------------------------------

/// Column letters for a 0-based column index (0 → A, 26 → AA).
pub fn col_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Parse an A1 range like `A2:K400` into 0-based `(start_row, start_col,
/// end_row_exclusive, end_col_exclusive)`.
pub fn parse_a1_range(range: &str) -> Result<(usize, usize, usize, usize), SheetError> {
    let (start, end) = range
        .split_once(':')
        .ok_or_else(|| SheetError::BadRange(range.to_string()))?;
    let (r1, c1) = parse_a1_cell(start).ok_or_else(|| SheetError::BadRange(range.to_string()))?;
    let (r2, c2) = parse_a1_cell(end).ok_or_else(|| SheetError::BadRange(range.to_string()))?;
    if r2 < r1 || c2 < c1 {
        return Err(SheetError::BadRange(range.to_string()));
    }
    Ok((r1, c1, r2 + 1, c2 + 1))
}

fn parse_a1_cell(cell: &str) -> Option<(usize, usize)> {
    let cell = cell.trim();
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_letters_roundtrip() {
        assert_eq!(col_letters(0), "A");
        assert_eq!(col_letters(10), "K");
        assert_eq!(col_letters(25), "Z");
        assert_eq!(col_letters(26), "AA");
        assert_eq!(col_letters(27), "AB");
    }

    #[test]
    fn cell_update_a1() {
        let update = CellUpdate {
            row: 3,
            col: 4,
            value: "x".into(),
        };
        assert_eq!(update.a1(), "E3");
    }

    #[test]
    fn parse_range() {
        assert_eq!(parse_a1_range("A2:K400").unwrap(), (1, 0, 400, 11));
        assert_eq!(parse_a1_range("G2:G400").unwrap(), (1, 6, 400, 7));
        assert!(parse_a1_range("A2").is_err());
        assert!(parse_a1_range("K4:A2").is_err());
        assert!(parse_a1_range("2A:3B").is_err());
    }
}
