//! Domain types for tracked bills and upstream master-list entries.
//!
//! Worksheet cells are plain strings; enrichment columns use the explicit
//! [`Enrichment`] tri-state so "needs backfill" is a total function over the
//! type instead of string-sniffing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::header::{columns, HeaderMap};
use crate::normalize::extract_display_number;

/// Sentinel written to cells whose value is not known upstream.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Enrichment tri-state
// ---------------------------------------------------------------------------

/// State of a single enrichment field on a tracked row.
///
/// `Absent` is an empty cell; `Unknown` is the literal `Unknown` sentinel a
/// previous pass wrote; `Present` holds real fetched content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Enrichment {
    #[default]
    Absent,
    Unknown,
    Present(String),
}

impl Enrichment {
    /// Interpret a raw worksheet cell.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Enrichment::Absent
        } else if trimmed == UNKNOWN {
            Enrichment::Unknown
        } else {
            Enrichment::Present(trimmed.to_string())
        }
    }

    /// True when a sync pass should fetch and fill this field. The
    /// `Unknown` sentinel means a fetch already happened and upstream had
    /// nothing; it does not re-trigger.
    pub fn needs_backfill(&self) -> bool {
        matches!(self, Enrichment::Absent)
    }

    /// Cell representation for writing back to the worksheet.
    pub fn as_cell(&self) -> &str {
        match self {
            Enrichment::Absent => "",
            Enrichment::Unknown => UNKNOWN,
            Enrichment::Present(value) => value,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracked row
// ---------------------------------------------------------------------------

/// One row of a tracked worksheet.
///
/// `(state, number)` is the human-assigned identity key; `bill_id`, once
/// known, is the authoritative identity and takes precedence in dedup.
/// Rows are created by humans or the add-bot and mutated only by the
/// reconciler; the system never deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedBill {
    pub state: String,
    pub number: String,
    pub bill_type: String,
    pub status: String,
    pub date: String,
    pub summary: String,
    pub change_hash: String,
    pub bill_id: Option<u64>,
    pub sponsors: Enrichment,
    pub calendar: Enrichment,
    pub history: Enrichment,
    pub pdf_links: Enrichment,
    pub url: String,
}

/// A row cell that could not be interpreted.
#[derive(Debug, Error)]
pub enum RowParseError {
    #[error("bill id cell '{0}' is not numeric")]
    BadBillId(String),
}

impl TrackedBill {
    /// Parse one worksheet record using the resolved header map.
    ///
    /// Missing columns read as empty cells; only a garbage `Bill ID` cell is
    /// an error (the row is then skipped and reported, not silently mangled).
    pub fn from_record(headers: &HeaderMap, record: &[String]) -> Result<Self, RowParseError> {
        let cell = |name: &str| -> String {
            headers
                .col(name)
                .and_then(|i| record.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        Ok(TrackedBill {
            state: cell(columns::STATE),
            number: cell(columns::NUMBER),
            bill_type: cell(columns::BILL_TYPE),
            status: cell(columns::STATUS),
            date: cell(columns::DATE),
            summary: cell(columns::SUMMARY),
            change_hash: cell(columns::CHANGE_HASH),
            bill_id: parse_bill_id(&cell(columns::BILL_ID))?,
            sponsors: Enrichment::from_cell(&cell(columns::SPONSORS)),
            calendar: Enrichment::from_cell(&cell(columns::CALENDAR)),
            history: Enrichment::from_cell(&cell(columns::HISTORY)),
            pdf_links: Enrichment::from_cell(&cell(columns::PDF)),
            url: cell(columns::URL),
        })
    }

    /// Display form of the bill number (hyperlink formulas unwrapped).
    pub fn display_number(&self) -> String {
        extract_display_number(&self.number).trim().to_string()
    }

    /// True when any enrichment field (or the bill id) still needs a
    /// detail fetch.
    pub fn needs_backfill(&self) -> bool {
        self.bill_id.is_none()
            || self.sponsors.needs_backfill()
            || self.calendar.needs_backfill()
            || self.history.needs_backfill()
            || self.pdf_links.needs_backfill()
    }
}

fn parse_bill_id(cell: &str) -> Result<Option<u64>, RowParseError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN {
        return Ok(None);
    }
    // Tolerate float-formatted ids ("188502.0") left behind by older tooling.
    let candidate = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    candidate
        .parse::<u64>()
        .map(Some)
        .map_err(|_| RowParseError::BadBillId(trimmed.to_string()))
}

// ---------------------------------------------------------------------------
// Upstream master-list entry
// ---------------------------------------------------------------------------

/// Raw per-bill entry from a LegiScan master list payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBill {
    pub bill_id: u64,
    pub number: String,
    pub change_hash: String,
    pub title: String,
    #[serde(default)]
    pub last_action: String,
    #[serde(default)]
    pub last_action_date: Option<String>,
    pub url: String,
}

/// Per-(state, normalized number) snapshot of upstream truth, rebuilt fully
/// on every sync pass and immutable within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterIndexEntry {
    pub change_hash: String,
    pub last_action: String,
    pub last_action_date: Option<String>,
    pub title: String,
    pub url: String,
    pub bill_id: u64,
}

impl MasterIndexEntry {
    pub fn from_raw(raw: &RawBill) -> Self {
        MasterIndexEntry {
            change_hash: raw.change_hash.clone(),
            last_action: raw.last_action.clone(),
            last_action_date: raw.last_action_date.clone(),
            title: raw.title.clone(),
            url: raw.url.clone(),
            bill_id: raw.bill_id,
        }
    }

    /// The `Date` cell value this entry implies: the upstream date, or the
    /// `Unknown` sentinel when upstream has none.
    pub fn date_cell(&self) -> String {
        match &self.last_action_date {
            Some(date) if !date.trim().is_empty() => date.trim().to_string(),
            _ => UNKNOWN.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Flattened bill detail
// ---------------------------------------------------------------------------

/// Flattened `getBill` payload: the enrichment strings a tracked row stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDetail {
    pub bill_id: u64,
    pub title: String,
    pub url: String,
    pub sponsors: String,
    pub calendar: String,
    pub history: String,
    pub pdf_links: String,
    /// Action text of the most recent history event, if any.
    #[serde(default)]
    pub latest_action: Option<String>,
    /// Date of the most recent history event, if any.
    #[serde(default)]
    pub latest_action_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
