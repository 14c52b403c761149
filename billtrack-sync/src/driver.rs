//! Worksheet pass orchestration.
//!
//! One pass per (worksheet, year): clear the success marker, rebuild the
//! master index, reconcile every row, apply one batched write, then persist
//! snapshot + digest and set the marker. Per-row failures are isolated into
//! the dev report; store failures abort the pass with the marker down so
//! the next pass takes the full path.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use billtrack_core::{columns, HeaderMap, RawBill, TrackedBill};
use billtrack_sheets::{col_letters, CellStyle, CellUpdate, SheetStore};

use crate::digest::sheet_digest;
use crate::error::SyncError;
use crate::master_index::MasterIndex;
use crate::reconcile::{previous_key, DetailSource, PreviousRows, Reconciler, RowState};
use crate::report::{new_bill_alert, status_change_alert, ReconciliationReport, SocialPoster};
use crate::run_state::{RunState, RunStateStore};
use crate::snapshot::{SheetStats, SnapshotStore};

/// Live master lists, keyed by full state name.
pub trait MasterSource {
    fn master_lists(&self, year: i32) -> BTreeMap<String, Vec<RawBill>>;
}

// ---------------------------------------------------------------------------
// Worksheet roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct WorksheetSpec {
    pub name: &'static str,
    /// Rollover sheets track the previous year's carried-over bills.
    pub rollover: bool,
    pub new_heading: &'static str,
    pub change_heading: &'static str,
}

pub const WORKSHEETS: [WorksheetSpec; 4] = [
    WorksheetSpec {
        name: "Anti-LGBTQ Bills",
        rollover: false,
        new_heading: "🚨ALERT NEW BILL 🚨",
        change_heading: "🏛 Status Change 🏛",
    },
    WorksheetSpec {
        name: "Pro-LGBTQ Bills",
        rollover: false,
        new_heading: "🌈NEW GOOD BILL 🌈",
        change_heading: "🌈Status Change 🏛",
    },
    WorksheetSpec {
        name: "Rollover Anti-LGBTQ Bills",
        rollover: true,
        new_heading: "🚨ALERT NEW BILL 🚨",
        change_heading: "🏛 Status Change 🏛",
    },
    WorksheetSpec {
        name: "Rollover Pro-LGBTQ Bills",
        rollover: true,
        new_heading: "🌈NEW GOOD BILL 🌈",
        change_heading: "🌈Status Change 🏛",
    },
];

// ---------------------------------------------------------------------------
// Pass outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub new: usize,
    pub changed: usize,
    pub backfilled: usize,
    pub unchanged: usize,
    pub patched_cells: usize,
}

#[derive(Debug)]
pub struct WorksheetOutcome {
    pub report: ReconciliationReport,
    pub counts: PassCounts,
    pub stats: SheetStats,
    /// True when the digest fast path skipped the per-row work.
    pub skipped: bool,
}

// ---------------------------------------------------------------------------
// Syncer
// ---------------------------------------------------------------------------

pub struct Syncer<'a, M: MasterSource, D: DetailSource, P: SocialPoster> {
    pub master: &'a M,
    pub details: &'a D,
    pub social: &'a P,
    pub snapshots: &'a SnapshotStore,
    pub run_states: &'a RunStateStore,
}

impl<'a, M: MasterSource, D: DetailSource, P: SocialPoster> Syncer<'a, M, D, P> {
    /// Run one pass over `sheet`.
    pub fn sync_worksheet(
        &self,
        sheet: &mut dyn SheetStore,
        spec: &WorksheetSpec,
        year: i32,
    ) -> Result<WorksheetOutcome, SyncError> {
        // Marker down first; it comes back up only at the very end.
        let prior = self.run_states.clear_success(spec.name, year)?;

        let effective_year = if spec.rollover { year - 1 } else { year };
        let lists = self.master.master_lists(effective_year);
        let index = MasterIndex::build(&lists);
        tracing::info!(
            "worksheet '{}' year {year}: master index covers {} states",
            spec.name,
            index.state_count()
        );

        let headers = HeaderMap::from_row(sheet.read_header_row()?);
        for required in [
            columns::STATE,
            columns::NUMBER,
            columns::STATUS,
            columns::DATE,
            columns::CHANGE_HASH,
        ] {
            headers.require(required)?;
        }

        let records = sheet.read_all_records(&headers)?;
        let mut report = ReconciliationReport::default();
        let parsed = parse_rows(spec.name, &headers, &records, Some(&mut report));

        let rows: Vec<TrackedBill> = parsed.iter().map(|(_, row)| row.clone()).collect();
        let digest = sheet_digest(&rows, &index);
        let wants_work = rows.iter().any(TrackedBill::needs_backfill);
        if prior.last_success && prior.digest.as_deref() == Some(digest.as_str()) && !wants_work {
            tracing::info!("worksheet '{}' year {year}: digest match, skipping", spec.name);
            self.run_states.save(spec.name, year, &prior)?;
            return Ok(WorksheetOutcome {
                report,
                counts: PassCounts::default(),
                stats: SheetStats::from_rows(&rows),
                skipped: true,
            });
        }

        // First run: the current rows stand in for the previous pass, so a
        // fresh deploy does not re-announce the whole sheet.
        let previous: PreviousRows = self
            .snapshots
            .load(spec.name, year)
            .unwrap_or_else(|| rows.clone())
            .into_iter()
            .map(|row| (previous_key(&row), row))
            .collect();

        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: self.details,
        };

        let mut counts = PassCounts::default();
        let mut updates: Vec<CellUpdate> = Vec::new();
        for (sheet_row, _) in &parsed {
            let record = &records[sheet_row - 2];
            match reconciler.reconcile(&headers, record, *sheet_row) {
                Ok(outcome) => {
                    match outcome.row_state {
                        RowState::New => counts.new += 1,
                        RowState::Changed => counts.changed += 1,
                        RowState::Backfill => counts.backfilled += 1,
                        RowState::Unchanged => counts.unchanged += 1,
                    }
                    for update in outcome.updates {
                        if let Some(col) = headers.col(update.column) {
                            updates.push(CellUpdate {
                                row: *sheet_row,
                                col,
                                value: update.value,
                            });
                        }
                    }
                    if let Some(facts) = outcome.facts {
                        let alert = match outcome.row_state {
                            RowState::New => new_bill_alert(
                                spec.new_heading,
                                &facts.state,
                                &facts.number,
                                &facts.title,
                                &facts.url,
                            ),
                            _ => status_change_alert(
                                spec.change_heading,
                                &facts.state,
                                &facts.number,
                                &facts.action,
                                &facts.date,
                                &facts.url,
                            ),
                        };
                        if matches!(outcome.row_state, RowState::New) {
                            report.new_bills.push(alert);
                        } else {
                            report.history_changes.push(alert);
                        }
                    }
                }
                Err(err) => {
                    report.dev_errors.push(format!(
                        "worksheet '{}' row {sheet_row}: {err}",
                        spec.name
                    ));
                }
            }
        }
        counts.patched_cells = updates.len();

        for alert in report.new_bills.iter().chain(&report.history_changes) {
            if let Err(err) = self.social.post(alert) {
                tracing::error!("social post failed: {err}");
                report.dev_errors.push(format!("social post failed: {err}"));
            }
        }

        if !updates.is_empty() {
            sheet.batch_update(&updates)?;
        }

        // Formatting runs before the marker goes up, so a formatting
        // failure forces a retry next pass.
        let signature = header_signature(&headers);
        let mut format_signature = prior.format_signature.clone();
        if format_signature.as_deref() != Some(signature.as_str()) {
            apply_formatting(sheet, &headers, records.len())?;
            format_signature = Some(signature);
        }

        // Re-pull so snapshot and digest reflect what the sheet now holds,
        // including concurrent human edits.
        let final_records = sheet.read_all_records(&headers)?;
        let final_rows: Vec<TrackedBill> = parse_rows(spec.name, &headers, &final_records, None)
            .into_iter()
            .map(|(_, row)| row)
            .collect();
        self.snapshots.save(spec.name, year, &final_rows)?;
        self.run_states.save(
            spec.name,
            year,
            &RunState {
                digest: Some(sheet_digest(&final_rows, &index)),
                last_success: true,
                format_signature,
            },
        )?;

        Ok(WorksheetOutcome {
            report,
            counts,
            stats: SheetStats::from_rows(&final_rows),
            skipped: false,
        })
    }

    /// Run every worksheet for every year, isolating failures per
    /// worksheet.
    pub fn run_all<F>(&self, years: &[i32], mut open_sheet: F) -> ReconciliationReport
    where
        F: FnMut(i32, &WorksheetSpec) -> Result<Box<dyn SheetStore>, SyncError>,
    {
        let mut report = ReconciliationReport::default();
        for year in years {
            for spec in &WORKSHEETS {
                let mut sheet = match open_sheet(*year, spec) {
                    Ok(sheet) => sheet,
                    Err(err) => {
                        tracing::error!("cannot open worksheet '{}' {year}: {err}", spec.name);
                        report
                            .dev_errors
                            .push(format!("worksheet '{}' {year}: {err}", spec.name));
                        continue;
                    }
                };
                match self.sync_worksheet(sheet.as_mut(), spec, *year) {
                    Ok(outcome) => report.merge(outcome.report),
                    Err(err) => {
                        tracing::error!("worksheet '{}' {year} failed: {err}", spec.name);
                        report
                            .dev_errors
                            .push(format!("worksheet '{}' {year}: {err}", spec.name));
                    }
                }
            }
        }
        report
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse data records into rows with their 1-based sheet row numbers,
/// skipping blank rows. Parse failures go into `report` when given.
fn parse_rows(
    worksheet: &str,
    headers: &HeaderMap,
    records: &[Vec<String>],
    mut report: Option<&mut ReconciliationReport>,
) -> Vec<(usize, TrackedBill)> {
    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let sheet_row = i + 2;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match TrackedBill::from_record(headers, record) {
            Ok(row) => {
                if row.state.is_empty() && row.number.is_empty() {
                    continue;
                }
                rows.push((sheet_row, row));
            }
            Err(err) => {
                if let Some(report) = report.as_mut() {
                    report
                        .dev_errors
                        .push(format!("worksheet '{worksheet}' row {sheet_row}: {err}"));
                }
            }
        }
    }
    rows
}

fn header_signature(headers: &HeaderMap) -> String {
    let mut hasher = Sha256::new();
    for name in headers.names() {
        hasher.update(name.trim().as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

fn apply_formatting(
    sheet: &mut dyn SheetStore,
    headers: &HeaderMap,
    record_count: usize,
) -> Result<(), SyncError> {
    if headers.is_empty() {
        return Ok(());
    }
    let last_row = record_count.max(1) + 1;
    let last_col = col_letters(headers.len() - 1);
    sheet.format_range(
        &format!("A2:{last_col}{last_row}"),
        &CellStyle {
            font_family: Some("Arial".to_string()),
            font_size: Some(10),
            center: false,
            date_format: false,
        },
    )?;
    if let Some(date_col) = headers.col(columns::DATE) {
        let letters = col_letters(date_col);
        sheet.format_range(
            &format!("{letters}2:{letters}{last_row}"),
            &CellStyle {
                font_family: None,
                font_size: None,
                center: true,
                date_format: true,
            },
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
