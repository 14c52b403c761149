//! Per-row reconciliation against the master index.
//!
//! Each tracked row lands in exactly one state per pass:
//!
//! - `New` — the previous pass never saw the row, or its stored change
//!   hash is empty; the bill was just added.
//! - `Changed` — the stored hash differs from upstream AND the change is
//!   observable (status or date actually moved). A hash-only churn with no
//!   visible difference updates the stored hash silently.
//! - `Backfill` — identity is current but enrichment cells are missing.
//! - `Unchanged` — nothing to do.
//!
//! The reconciler emits minimal cell patches: a cell is written only when
//! its new value differs from what the sheet already holds, so a pass over
//! a settled sheet produces zero writes.

use std::collections::BTreeMap;

use billtrack_core::normalize::normalize_bill_number;
use billtrack_core::types::RowParseError;
use billtrack_core::{columns, risk, BillDetail, Enrichment, HeaderMap, TrackedBill, UNKNOWN};
use billtrack_sheets::col_letters;

use crate::master_index::MasterIndex;

/// Detail lookup injected into the reconciler; production backs this with
/// the hash-gated cache over `getBill`, tests with fixtures. `None` means
/// the detail could not be obtained this pass.
pub trait DetailSource {
    fn bill_detail(&self, bill_id: u64, change_hash: &str) -> Option<BillDetail>;
}

/// A source with no details; enrichment cells fall back to the sentinel.
pub struct NoDetails;

impl DetailSource for NoDetails {
    fn bill_detail(&self, _bill_id: u64, _change_hash: &str) -> Option<BillDetail> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    New,
    Changed,
    Backfill,
    Unchanged,
}

/// One dirty cell, addressed by column name; the driver resolves it to a
/// concrete column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub column: &'static str,
    pub value: String,
}

/// What a notification needs to know about a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillFacts {
    pub state: String,
    pub number: String,
    pub title: String,
    pub action: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug)]
pub struct RowOutcome {
    pub row_state: RowState,
    pub updates: Vec<FieldUpdate>,
    /// Present for `New` and `Changed` rows; drives notifications.
    pub facts: Option<BillFacts>,
}

/// Previous-pass rows keyed by `(state, normalized number)`.
pub type PreviousRows = BTreeMap<(String, String), TrackedBill>;

/// Key a row for the previous-rows map.
pub fn previous_key(row: &TrackedBill) -> (String, String) {
    (
        row.state.trim().to_string(),
        normalize_bill_number(&row.number),
    )
}

pub struct Reconciler<'a, D: DetailSource> {
    pub index: &'a MasterIndex,
    pub previous: &'a PreviousRows,
    pub details: &'a D,
}

impl<'a, D: DetailSource> Reconciler<'a, D> {
    /// Reconcile one sheet record. `sheet_row` is the 1-based sheet row
    /// (data starts at row 2) and is only used for row-anchored formulas.
    pub fn reconcile(
        &self,
        headers: &HeaderMap,
        record: &[String],
        sheet_row: usize,
    ) -> Result<RowOutcome, RowParseError> {
        let row = TrackedBill::from_record(headers, record)?;
        let mut updates = Vec::new();

        refresh_risk_formulas(&mut updates, headers, record, sheet_row);

        let Some(entry) = self.index.lookup(&row.state, &row.number) else {
            // Not in any live master list: a dead or out-of-session bill.
            // Its date is forced to the sentinel so a stale date cannot
            // linger; the minimal-write check suppresses redundant writes.
            push_if_differs(&mut updates, headers, record, columns::DATE, UNKNOWN.into());
            return Ok(RowOutcome {
                row_state: RowState::Unchanged,
                updates,
                facts: None,
            });
        };

        // A row the previous pass never saw is new even when someone
        // hand-copied it in with a hash already filled.
        let known_before = self.previous.contains_key(&previous_key(&row));
        let is_new = !known_before || row.change_hash.is_empty();
        let hash_differs = !is_new && entry.change_hash != row.change_hash;
        let observable =
            entry.last_action.trim() != row.status || entry.date_cell() != row.date;

        let row_state = if is_new {
            RowState::New
        } else if hash_differs && observable {
            RowState::Changed
        } else if row.needs_backfill() {
            RowState::Backfill
        } else {
            RowState::Unchanged
        };

        // Identity and status cells track upstream unconditionally; a
        // non-observable hash churn still lands silently.
        if !entry.last_action.trim().is_empty() {
            push_if_differs(
                &mut updates,
                headers,
                record,
                columns::STATUS,
                entry.last_action.trim().to_string(),
            );
        }
        if !entry.title.trim().is_empty() {
            push_if_differs(
                &mut updates,
                headers,
                record,
                columns::SUMMARY,
                entry.title.trim().to_string(),
            );
        }
        push_if_differs(&mut updates, headers, record, columns::DATE, entry.date_cell());
        push_if_differs(
            &mut updates,
            headers,
            record,
            columns::CHANGE_HASH,
            entry.change_hash.clone(),
        );
        push_if_differs(
            &mut updates,
            headers,
            record,
            columns::BILL_ID,
            entry.bill_id.to_string(),
        );
        if !entry.url.trim().is_empty() && row.url != entry.url {
            push_if_differs(
                &mut updates,
                headers,
                record,
                columns::URL,
                entry.url.clone(),
            );
            let display = row.display_number();
            if !display.is_empty() {
                push_if_differs(
                    &mut updates,
                    headers,
                    record,
                    columns::NUMBER,
                    format!(r#"=HYPERLINK("{}","{display}")"#, entry.url),
                );
            }
        }

        let mut facts_title = entry.title.trim().to_string();
        let mut facts_action = entry.last_action.trim().to_string();
        let mut facts_date = entry.date_cell();

        if is_new || hash_differs || row.needs_backfill() {
            match self.details.bill_detail(entry.bill_id, &entry.change_hash) {
                Some(detail) => {
                    self.apply_detail(&mut updates, headers, record, &row, &detail);
                    // Master lists occasionally carry a blank title, action,
                    // or URL; the detail payload is the fallback.
                    if facts_title.is_empty() && !detail.title.trim().is_empty() {
                        facts_title = detail.title.trim().to_string();
                        push_if_differs(
                            &mut updates,
                            headers,
                            record,
                            columns::SUMMARY,
                            facts_title.clone(),
                        );
                    }
                    if row.url.is_empty()
                        && entry.url.trim().is_empty()
                        && !detail.url.trim().is_empty()
                    {
                        push_if_differs(
                            &mut updates,
                            headers,
                            record,
                            columns::URL,
                            detail.url.trim().to_string(),
                        );
                    }
                    if facts_action.is_empty() {
                        if let Some(action) = detail.latest_action.as_deref() {
                            facts_action = action.trim().to_string();
                            push_if_differs(
                                &mut updates,
                                headers,
                                record,
                                columns::STATUS,
                                facts_action.clone(),
                            );
                        }
                    }
                    if facts_date == UNKNOWN {
                        if let Some(date) = detail.latest_action_date.as_deref() {
                            facts_date = date.trim().to_string();
                            push_if_differs(
                                &mut updates,
                                headers,
                                record,
                                columns::DATE,
                                facts_date.clone(),
                            );
                        }
                    }
                }
                None => mark_unfetchable(&mut updates, headers, record, &row),
            }
        }

        let facts = matches!(row_state, RowState::New | RowState::Changed).then(|| BillFacts {
            state: row.state.clone(),
            number: row.display_number(),
            title: facts_title,
            action: facts_action,
            date: facts_date,
            url: entry.url.clone(),
        });

        Ok(RowOutcome {
            row_state,
            updates,
            facts,
        })
    }

    fn apply_detail(
        &self,
        updates: &mut Vec<FieldUpdate>,
        headers: &HeaderMap,
        record: &[String],
        row: &TrackedBill,
        detail: &BillDetail,
    ) {
        let fields: [(&'static str, &Enrichment, &str); 4] = [
            (columns::SPONSORS, &row.sponsors, &detail.sponsors),
            (columns::CALENDAR, &row.calendar, &detail.calendar),
            (columns::HISTORY, &row.history, &detail.history),
            (columns::PDF, &row.pdf_links, &detail.pdf_links),
        ];
        for (column, current, fetched) in fields {
            let fetched = fetched.trim();
            if !fetched.is_empty() {
                push_if_differs(updates, headers, record, column, fetched.to_string());
            } else if current.needs_backfill() {
                // Upstream genuinely has nothing; mark the cell so the next
                // pass does not re-fetch for this field alone.
                push_if_differs(updates, headers, record, column, UNKNOWN.into());
            }
        }
    }
}

fn mark_unfetchable(
    updates: &mut Vec<FieldUpdate>,
    headers: &HeaderMap,
    record: &[String],
    row: &TrackedBill,
) {
    let fields: [(&'static str, &Enrichment); 4] = [
        (columns::SPONSORS, &row.sponsors),
        (columns::CALENDAR, &row.calendar),
        (columns::HISTORY, &row.history),
        (columns::PDF, &row.pdf_links),
    ];
    for (column, current) in fields {
        if *current == Enrichment::Absent {
            push_if_differs(updates, headers, record, column, UNKNOWN.into());
        }
    }
}

fn refresh_risk_formulas(
    updates: &mut Vec<FieldUpdate>,
    headers: &HeaderMap,
    record: &[String],
    sheet_row: usize,
) {
    // The lookup key is the row's State cell, wherever that column sits.
    let Some(state_col) = headers.col(columns::STATE) else {
        return;
    };
    let state_col = col_letters(state_col);
    // The values read back from a formula cell are its computed result, so
    // equality checks are useless here; only fill genuinely empty cells.
    for (column, formula) in [
        (
            columns::ADULT_RISK,
            risk::adult_risk_formula(&state_col, sheet_row),
        ),
        (
            columns::YOUTH_RISK,
            risk::youth_risk_formula(&state_col, sheet_row),
        ),
    ] {
        if headers.col(column).is_some() && current_cell(headers, record, column).is_empty() {
            updates.push(FieldUpdate {
                column,
                value: formula,
            });
        }
    }
}

fn current_cell<'r>(headers: &HeaderMap, record: &'r [String], column: &str) -> &'r str {
    headers
        .col(column)
        .and_then(|i| record.get(i))
        .map(|v| v.trim())
        .unwrap_or("")
}

/// Queue a write only when the column exists and the sheet value differs.
fn push_if_differs(
    updates: &mut Vec<FieldUpdate>,
    headers: &HeaderMap,
    record: &[String],
    column: &'static str,
    value: String,
) {
    if headers.col(column).is_none() {
        return;
    }
    if current_cell(headers, record, column) != value.trim() {
        updates.push(FieldUpdate { column, value });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use billtrack_core::RawBill;

    struct FixtureDetails {
        detail: BillDetail,
        expected_bill_id: u64,
    }

    impl DetailSource for FixtureDetails {
        fn bill_detail(&self, bill_id: u64, _change_hash: &str) -> Option<BillDetail> {
            assert_eq!(bill_id, self.expected_bill_id);
            Some(self.detail.clone())
        }
    }

    fn headers() -> HeaderMap {
        HeaderMap::from_row(vec![
            "State".into(),
            "Number".into(),
            "Status".into(),
            "Date".into(),
            "Change Hash".into(),
            "Bill ID".into(),
            "Sponsors".into(),
            "Calendar".into(),
            "History".into(),
            "PDF".into(),
            "URL".into(),
            "Summary".into(),
        ])
    }

    fn record(
        state: &str,
        number: &str,
        status: &str,
        date: &str,
        hash: &str,
        bill_id: &str,
        url: &str,
    ) -> Vec<String> {
        vec![
            state.into(),
            number.into(),
            status.into(),
            date.into(),
            hash.into(),
            bill_id.into(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            url.into(),
            String::new(),
        ]
    }

    /// Seed a previous-pass map with the row parsed from `record`.
    fn previous_of(headers: &HeaderMap, record: &[String]) -> PreviousRows {
        let row = TrackedBill::from_record(headers, record).unwrap();
        PreviousRows::from([(previous_key(&row), row)])
    }

    fn ohio_index(hash: &str, action: &str, date: Option<&str>) -> MasterIndex {
        let mut lists = BTreeMap::new();
        lists.insert(
            "Ohio".to_string(),
            vec![RawBill {
                bill_id: 42,
                number: "HB68".into(),
                change_hash: hash.into(),
                title: "An act".into(),
                last_action: action.into(),
                last_action_date: date.map(str::to_string),
                url: "https://legiscan.test/OH/HB68".into(),
            }],
        );
        MasterIndex::build(&lists)
    }

    fn detail_fixture() -> BillDetail {
        BillDetail {
            bill_id: 42,
            title: "An act".into(),
            url: "https://legiscan.test/OH/HB68".into(),
            sponsors: "Rep. A".into(),
            calendar: "".into(),
            history: "H 2025-01-10 Introduced".into(),
            pdf_links: "https://ohio.test/hb68.pdf".into(),
            latest_action: Some("Introduced".into()),
            latest_action_date: Some("2025-01-10".into()),
        }
    }

    fn value_of<'o>(outcome: &'o RowOutcome, column: &str) -> Option<&'o str> {
        outcome
            .updates
            .iter()
            .find(|u| u.column == column)
            .map(|u| u.value.as_str())
    }

    #[test]
    fn freshly_added_row_is_new_and_fully_patched() {
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let previous = PreviousRows::new();
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let rec = record("Ohio", "HB68", "", "", "", "", "https://legiscan.test/OH/HB68");
        let outcome = reconciler.reconcile(&headers(), &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::New);
        assert_eq!(value_of(&outcome, columns::STATUS), Some("Introduced"));
        assert_eq!(value_of(&outcome, columns::DATE), Some("2025-01-10"));
        assert_eq!(value_of(&outcome, columns::CHANGE_HASH), Some("abc"));
        assert_eq!(value_of(&outcome, columns::BILL_ID), Some("42"));
        assert_eq!(value_of(&outcome, columns::SPONSORS), Some("Rep. A"));
        assert_eq!(value_of(&outcome, columns::SUMMARY), Some("An act"));
        let facts = outcome.facts.expect("new rows notify");
        assert_eq!(facts.state, "Ohio");
        assert_eq!(facts.number, "HB68");
        assert_eq!(facts.action, "Introduced");
    }

    #[test]
    fn settled_row_produces_no_patches() {
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let headers = headers();
        let mut rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        rec[6] = "Rep. A".into();
        rec[7] = "hearing 2025-02-01".into();
        rec[8] = "H 2025-01-10 Introduced".into();
        rec[9] = "x.pdf".into();
        rec[11] = "An act".into();
        let previous = previous_of(&headers, &rec);
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let outcome = reconciler.reconcile(&headers, &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Unchanged);
        assert!(outcome.facts.is_none());
        assert!(outcome.updates.is_empty(), "got {:?}", outcome.updates);
    }

    #[test]
    fn hash_churn_without_observable_diff_is_silent() {
        let index = ohio_index("xyz", "Introduced", Some("2025-01-10"));
        let headers = headers();
        let mut rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        rec[6] = "Rep. A".into();
        rec[7] = "hearing 2025-02-01".into();
        rec[8] = "H 2025-01-10 Introduced".into();
        rec[9] = "https://ohio.test/hb68.pdf".into();
        rec[11] = "An act".into();
        let previous = previous_of(&headers, &rec);
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let outcome = reconciler.reconcile(&headers, &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Unchanged);
        assert!(outcome.facts.is_none(), "no notification without a visible diff");
        // The stored hash still catches up.
        assert_eq!(value_of(&outcome, columns::CHANGE_HASH), Some("xyz"));
    }

    #[test]
    fn observable_status_move_is_changed() {
        let index = ohio_index("xyz", "Passed House", Some("2025-03-01"));
        let headers = headers();
        let rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        let previous = previous_of(&headers, &rec);
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let outcome = reconciler.reconcile(&headers, &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Changed);
        assert_eq!(value_of(&outcome, columns::STATUS), Some("Passed House"));
        assert_eq!(value_of(&outcome, columns::DATE), Some("2025-03-01"));
        let facts = outcome.facts.expect("changed rows notify");
        assert_eq!(facts.action, "Passed House");
        assert_eq!(facts.date, "2025-03-01");
    }

    #[test]
    fn known_bill_with_missing_enrichment_is_backfill() {
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let headers = headers();
        let rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        let previous = previous_of(&headers, &rec);
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let outcome = reconciler.reconcile(&headers, &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Backfill);
        assert!(outcome.facts.is_none());
        assert_eq!(value_of(&outcome, columns::SPONSORS), Some("Rep. A"));
        assert_eq!(value_of(&outcome, columns::HISTORY), Some("H 2025-01-10 Introduced"));
        // Upstream has no calendar for this bill: sentinel, not a re-fetch
        // next pass.
        assert_eq!(value_of(&outcome, columns::CALENDAR), Some(UNKNOWN));
    }

    #[test]
    fn unlisted_bill_only_gets_a_date_sentinel() {
        let index = MasterIndex::default();
        let previous = PreviousRows::new();
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let rec = record("Ohio", "HB68", "Introduced", "", "abc", "42", "");
        let outcome = reconciler.reconcile(&headers(), &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Unchanged);
        assert_eq!(outcome.updates.len(), 1);
        assert_eq!(value_of(&outcome, columns::DATE), Some(UNKNOWN));
    }

    #[test]
    fn unfetchable_detail_marks_empty_cells_unknown() {
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let headers = headers();
        let rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        let previous = previous_of(&headers, &rec);
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let outcome = reconciler.reconcile(&headers, &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Backfill);
        for column in [columns::SPONSORS, columns::CALENDAR, columns::HISTORY, columns::PDF] {
            assert_eq!(value_of(&outcome, column), Some(UNKNOWN));
        }
    }

    #[test]
    fn garbage_bill_id_is_a_row_error() {
        let index = MasterIndex::default();
        let previous = PreviousRows::new();
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let rec = record("Ohio", "HB68", "", "", "", "garbage", "");
        assert!(reconciler.reconcile(&headers(), &rec, 2).is_err());
    }

    #[test]
    fn upstream_url_move_rewrites_the_hyperlink() {
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let previous = PreviousRows::new();
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "",
            "",
            "https://old.test/HB68",
        );
        let outcome = reconciler.reconcile(&headers(), &rec, 2).unwrap();

        assert_eq!(
            value_of(&outcome, columns::URL),
            Some("https://legiscan.test/OH/HB68")
        );
        assert_eq!(
            value_of(&outcome, columns::NUMBER),
            Some(r#"=HYPERLINK("https://legiscan.test/OH/HB68","HB68")"#)
        );
    }

    #[test]
    fn row_missing_from_the_snapshot_is_new_even_with_a_hash() {
        // A hand-copied row can arrive with its hash cell already filled;
        // the snapshot, not the hash, decides whether the row is new.
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let previous = PreviousRows::new();
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        let outcome = reconciler.reconcile(&headers(), &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::New);
        let facts = outcome.facts.expect("new rows notify");
        assert_eq!(facts.number, "HB68");
    }

    #[test]
    fn summary_cell_tracks_the_master_title() {
        let index = ohio_index("abc", "Introduced", Some("2025-01-10"));
        let headers = headers();
        let mut rec = record(
            "Ohio",
            "HB68",
            "Introduced",
            "2025-01-10",
            "abc",
            "42",
            "https://legiscan.test/OH/HB68",
        );
        rec[6] = "Rep. A".into();
        rec[7] = "hearing 2025-02-01".into();
        rec[8] = "H 2025-01-10 Introduced".into();
        rec[9] = "x.pdf".into();
        rec[11] = "A stale title".into();
        let previous = previous_of(&headers, &rec);
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let outcome = reconciler.reconcile(&headers, &rec, 2).unwrap();
        assert_eq!(value_of(&outcome, columns::SUMMARY), Some("An act"));
    }

    #[test]
    fn blank_master_title_falls_back_to_the_detail() {
        let mut lists = BTreeMap::new();
        lists.insert(
            "Ohio".to_string(),
            vec![RawBill {
                bill_id: 42,
                number: "HB68".into(),
                change_hash: "abc".into(),
                title: "".into(),
                last_action: "Introduced".into(),
                last_action_date: Some("2025-01-10".into()),
                url: "https://legiscan.test/OH/HB68".into(),
            }],
        );
        let index = MasterIndex::build(&lists);
        let previous = PreviousRows::new();
        let details = FixtureDetails {
            detail: detail_fixture(),
            expected_bill_id: 42,
        };
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &details,
        };

        let rec = record("Ohio", "HB68", "", "", "", "", "https://legiscan.test/OH/HB68");
        let outcome = reconciler.reconcile(&headers(), &rec, 2).unwrap();

        assert_eq!(value_of(&outcome, columns::SUMMARY), Some("An act"));
        let facts = outcome.facts.expect("new rows notify");
        assert_eq!(facts.title, "An act");
    }

    #[test]
    fn orphaned_row_date_is_forced_to_the_sentinel() {
        let index = MasterIndex::default();
        let previous = PreviousRows::new();
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        // A stale date must not linger once the bill drops off the lists.
        let rec = record("Ohio", "HB68", "Introduced", "2025-01-10", "abc", "42", "");
        let outcome = reconciler.reconcile(&headers(), &rec, 2).unwrap();

        assert_eq!(outcome.row_state, RowState::Unchanged);
        assert_eq!(value_of(&outcome, columns::DATE), Some(UNKNOWN));
    }

    #[test]
    fn empty_risk_cells_get_formulas() {
        let headers = HeaderMap::from_row(vec![
            "State".into(),
            "Number".into(),
            "Adult State Risk".into(),
            "Youth State Risk".into(),
        ]);
        let index = MasterIndex::default();
        let previous = PreviousRows::new();
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let rec: Vec<String> = vec!["Ohio".into(), "HB68".into(), "".into(), "High".into()];
        let outcome = reconciler.reconcile(&headers, &rec, 7).unwrap();
        assert_eq!(
            value_of(&outcome, columns::ADULT_RISK),
            Some("=VLOOKUP(TRIM($A7),'State Risk'!$A:$C,2,FALSE)")
        );
        // Non-empty risk cells are left alone.
        assert_eq!(value_of(&outcome, columns::YOUTH_RISK), None);
    }

    #[test]
    fn risk_formulas_follow_the_state_column() {
        let headers = HeaderMap::from_row(vec![
            "Number".into(),
            "State".into(),
            "Adult State Risk".into(),
        ]);
        let index = MasterIndex::default();
        let previous = PreviousRows::new();
        let reconciler = Reconciler {
            index: &index,
            previous: &previous,
            details: &NoDetails,
        };

        let rec: Vec<String> = vec!["HB68".into(), "Ohio".into(), "".into()];
        let outcome = reconciler.reconcile(&headers, &rec, 4).unwrap();
        assert_eq!(
            value_of(&outcome, columns::ADULT_RISK),
            Some("=VLOOKUP(TRIM($B4),'State Risk'!$A:$C,2,FALSE)")
        );
    }
}
