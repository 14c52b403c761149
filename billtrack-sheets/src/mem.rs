//! In-memory sheet store for tests and dry runs.

use billtrack_core::HeaderMap;

use crate::error::SheetError;
use crate::store::{CellStyle, CellUpdate, SheetStore};

/// A sheet held entirely in memory. Row 0 of `cells` is the header row.
#[derive(Debug, Clone, Default)]
pub struct MemSheet {
    cells: Vec<Vec<String>>,
    /// Number of `batch_update` calls made (one per pass is expected).
    pub batch_calls: usize,
    /// Ranges formatted so far.
    pub formatted: Vec<String>,
}

impl MemSheet {
    pub fn new(header: Vec<&str>, rows: Vec<Vec<&str>>) -> Self {
        let mut cells = Vec::with_capacity(rows.len() + 1);
        cells.push(header.into_iter().map(str::to_string).collect());
        for row in rows {
            cells.push(row.into_iter().map(str::to_string).collect());
        }
        MemSheet {
            cells,
            batch_calls: 0,
            formatted: Vec::new(),
        }
    }

    /// Raw cell access for assertions; `row` is 1-based, `col` 0-based.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row - 1)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl SheetStore for MemSheet {
    fn read_header_row(&self) -> Result<Vec<String>, SheetError> {
        Ok(self.cells.first().cloned().unwrap_or_default())
    }

    fn read_all_records(&self, headers: &HeaderMap) -> Result<Vec<Vec<String>>, SheetError> {
        let width = headers.len();
        Ok(self
            .cells
            .iter()
            .skip(1)
            .map(|row| {
                let mut padded = row.clone();
                padded.resize(width, String::new());
                padded
            })
            .collect())
    }

    fn batch_update(&mut self, updates: &[CellUpdate]) -> Result<(), SheetError> {
        self.batch_calls += 1;
        for update in updates {
            if update.row == 0 {
                return Err(SheetError::BadRange(update.a1()));
            }
            while self.cells.len() < update.row {
                self.cells.push(Vec::new());
            }
            let row = &mut self.cells[update.row - 1];
            if row.len() <= update.col {
                row.resize(update.col + 1, String::new());
            }
            row[update.col] = update.value.clone();
        }
        Ok(())
    }

    fn format_range(&mut self, range: &str, _style: &CellStyle) -> Result<(), SheetError> {
        self.formatted.push(range.to_string());
        Ok(())
    }
}
