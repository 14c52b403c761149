//! Header-name → column-index map for worksheet access.
//!
//! Resolved once per pass from the sheet's header row; all read and write
//! paths go through it. Column order in the sheet is never assumed.

use std::collections::HashMap;

use crate::error::HeaderError;

/// Well-known column names used by the tracker worksheets.
pub mod columns {
    pub const STATE: &str = "State";
    pub const NUMBER: &str = "Number";
    pub const BILL_TYPE: &str = "Bill Type";
    pub const STATUS: &str = "Status";
    pub const DATE: &str = "Date";
    pub const SUMMARY: &str = "Summary";
    pub const CHANGE_HASH: &str = "Change Hash";
    pub const BILL_ID: &str = "Bill ID";
    pub const SPONSORS: &str = "Sponsors";
    pub const CALENDAR: &str = "Calendar";
    pub const HISTORY: &str = "History";
    pub const PDF: &str = "PDF";
    pub const URL: &str = "URL";
    pub const ADULT_RISK: &str = "Adult State Risk";
    pub const YOUTH_RISK: &str = "Youth State Risk";
}

/// Column lookup resolved from a worksheet header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn from_row(row: Vec<String>) -> Self {
        let mut index = HashMap::new();
        for (i, name) in row.iter().enumerate() {
            // First occurrence wins on duplicate headers.
            index.entry(name.trim().to_string()).or_insert(i);
        }
        HeaderMap { names: row, index }
    }

    /// Zero-based column index for a header name.
    pub fn col(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`HeaderMap::col`] but an error when the column is absent.
    pub fn require(&self, name: &str) -> Result<usize, HeaderError> {
        self.col(name)
            .ok_or_else(|| HeaderError::MissingColumn(name.to_string()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
